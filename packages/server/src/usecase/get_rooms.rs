//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{PresenceRepository, RoomName};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn PresenceRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn PresenceRepository>) -> Self {
        Self { repository }
    }

    /// 空でないルームと人数（ルーム名順）
    pub async fn execute(&self) -> Vec<(RoomName, usize)> {
        self.repository.occupancy().await
    }
}
