//! InMemory Presence Repository 実装
//!
//! ドメイン層が定義する PresenceRepository trait の具体的な実装。
//! Presence ドメインモデルを 1 つの Mutex で保護し、registry と membership の
//! 更新を 1 回のロック区間で行います。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, JoinOutcome, Participant, Presence, PresenceRepository,
    RepositoryError, RoomName, Timestamp,
};

/// インメモリ Presence Repository 実装
#[derive(Default)]
pub struct InMemoryPresenceRepository {
    /// Presence ドメインモデル
    presence: Arc<Mutex<Presence>>,
}

impl InMemoryPresenceRepository {
    /// 新しい InMemoryPresenceRepository を作成
    pub fn new(presence: Arc<Mutex<Presence>>) -> Self {
        Self { presence }
    }
}

#[async_trait]
impl PresenceRepository for InMemoryPresenceRepository {
    async fn register(&self, id: ConnectionId) {
        let mut presence = self.presence.lock().await;
        presence.register(id);
    }

    async fn join(
        &self,
        id: &ConnectionId,
        display_name: DisplayName,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Result<JoinOutcome, RepositoryError> {
        let mut presence = self.presence.lock().await;
        Ok(presence.join(id, display_name, room, joined_at)?)
    }

    async fn get(&self, id: &ConnectionId) -> Option<Participant> {
        let presence = self.presence.lock().await;
        presence.participant(id)
    }

    async fn remove(&self, id: &ConnectionId) -> Option<Participant> {
        let mut presence = self.presence.lock().await;
        presence.depart(id)
    }

    async fn set_typing(
        &self,
        id: &ConnectionId,
        is_typing: bool,
    ) -> Result<Option<Participant>, RepositoryError> {
        let mut presence = self.presence.lock().await;
        Ok(presence.set_typing(id, is_typing)?)
    }

    async fn list_all(&self) -> Vec<Participant> {
        let presence = self.presence.lock().await;
        presence.list_all()
    }

    async fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        let presence = self.presence.lock().await;
        presence.members(room)
    }

    async fn room_participants(&self, room: &RoomName) -> Vec<Participant> {
        let presence = self.presence.lock().await;
        presence.room_participants(room)
    }

    async fn occupancy(&self) -> Vec<(RoomName, usize)> {
        let presence = self.presence.lock().await;
        presence.occupancy()
    }

    async fn count_connections(&self) -> usize {
        let presence = self.presence.lock().await;
        presence.connection_count()
    }
}
