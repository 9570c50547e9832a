//! UseCase: ルーム詳細取得

use std::sync::Arc;

use crate::domain::{Participant, PresenceRepository, RoomName};

use super::error::GetRoomDetailError;

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn PresenceRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn PresenceRepository>) -> Self {
        Self { repository }
    }

    /// ルームの参加者一覧を返す
    ///
    /// ルームは暗黙的に存在するため、参加者のいないルームは `RoomNotFound` として扱う。
    pub async fn execute(
        &self,
        room: String,
    ) -> Result<(RoomName, Vec<Participant>), GetRoomDetailError> {
        let room = RoomName::new(room);
        let participants = self.repository.room_participants(&room).await;
        if participants.is_empty() {
            return Err(GetRoomDetailError::RoomNotFound(room.into_string()));
        }
        Ok((room, participants))
    }
}
