//! Domain layer: value objects, entities, the presence model and the ports the
//! use cases depend on.

pub mod entity;
pub mod error;
pub mod event;
pub mod presence;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ChatMessage, Participant, TypingSignal};
pub use error::{DomainError, MessagePushError, PresenceError, RepositoryError};
pub use event::ServerEvent;
pub use presence::{ConnectionRegistry, JoinOutcome, Presence, RoomMembership};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::PresenceRepository;
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DEFAULT_ROOM, DisplayName, MessageBody, MessageId,
    MessageIdFactory, RoomName, Timestamp,
};

#[cfg(test)]
pub use pusher::MockMessagePusher;
