//! UseCase: イベント配信（ファンアウト）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EventBroadcaster::broadcast_to_room() / send_to_connection()
//!
//! ### なぜこのテストが必要か
//! - 配信対象がルームの membership スナップショットから正しく選ばれることを保証
//! - 送信失敗がファンアウト全体を止めないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム全員 / 送信者除外での配信
//! - エッジケース：未知のルーム（配信対象なし）
//! - 異常系：MessagePusher の送信失敗（握りつぶされる）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, PresenceRepository, PusherChannel, RoomName, ServerEvent,
};

/// イベント配信のユースケース
pub struct EventBroadcaster {
    /// Repository（ルームメンバーのスナップショット取得）
    repository: Arc<dyn PresenceRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl EventBroadcaster {
    /// 新しい EventBroadcaster を作成
    pub fn new(
        repository: Arc<dyn PresenceRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続の送信チャンネルを配信対象として登録
    pub async fn attach(&self, id: ConnectionId, sender: PusherChannel) {
        self.message_pusher.register_client(id, sender).await;
    }

    /// 接続の送信チャンネルを登録解除
    pub async fn detach(&self, id: &ConnectionId) {
        self.message_pusher.unregister_client(id).await;
    }

    /// ルームのメンバー全員（`exclude` を除く）にイベントを配信
    ///
    /// 配信対象は呼び出し時点の membership スナップショット。
    /// 送信できた件数を返し、失敗はログに残して 0 件扱いにする。
    pub async fn broadcast_to_room(
        &self,
        room: &RoomName,
        event: &ServerEvent,
        exclude: Option<&ConnectionId>,
    ) -> usize {
        let targets: Vec<ConnectionId> = self
            .repository
            .members(room)
            .await
            .into_iter()
            .filter(|id| Some(id) != exclude)
            .collect();
        if targets.is_empty() {
            tracing::debug!("No audience for '{}' in room '{}'", event.name(), room);
            return 0;
        }

        match self.message_pusher.broadcast(targets, event).await {
            Ok(delivered) => delivered,
            Err(e) => {
                tracing::warn!(
                    "Failed to broadcast '{}' to room '{}': {}",
                    event.name(),
                    room,
                    e
                );
                0
            }
        }
    }

    /// 1 つの接続にイベントを直接配信
    ///
    /// 切断済みの接続への送信は破棄される（エラーではない）。
    pub async fn send_to_connection(&self, id: &ConnectionId, event: &ServerEvent) -> bool {
        match self.message_pusher.push_to(id, event).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Dropped '{}' for '{}': {}", event.name(), id, e);
                false
            }
        }
    }
}
