//! Entities
//!
//! 同一性（ConnectionId / MessageId）を持つドメインの型。

use super::{ConnectionId, DisplayName, MessageBody, MessageId, RoomName, Timestamp};

/// One connected user who has joined a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ConnectionId,
    pub display_name: DisplayName,
    pub room: RoomName,
    pub joined_at: Timestamp,
    /// Last typing state broadcast to the room.
    pub is_typing: bool,
}

impl Participant {
    pub fn new(
        id: ConnectionId,
        display_name: DisplayName,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id,
            display_name,
            room,
            joined_at,
            is_typing: false,
        }
    }
}

/// A message relayed to every member of the sender's room. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: DisplayName,
    pub body: MessageBody,
    pub sent_at: Timestamp,
}

impl ChatMessage {
    pub fn new(id: MessageId, author: DisplayName, body: MessageBody, sent_at: Timestamp) -> Self {
        Self {
            id,
            author,
            body,
            sent_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    pub display_name: DisplayName,
    pub is_typing: bool,
}

impl TypingSignal {
    pub fn new(display_name: DisplayName, is_typing: bool) -> Self {
        Self {
            display_name,
            is_typing,
        }
    }
}
