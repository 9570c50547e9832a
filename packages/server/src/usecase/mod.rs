//! UseCase layer: the session lifecycle controller, event fan-out and the
//! read-only room queries.

mod broadcaster;
mod error;
mod get_room_detail;
mod get_rooms;
mod session;

pub use broadcaster::EventBroadcaster;
pub use error::{GetRoomDetailError, SessionError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use session::{SessionCommand, SessionController};
