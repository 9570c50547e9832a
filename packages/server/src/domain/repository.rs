//! Repository trait 定義
//!
//! ドメイン層が必要とする Presence（接続レジストリ + ルーム所属）へのアクセスを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    ConnectionId, DisplayName, JoinOutcome, Participant, RepositoryError, RoomName, Timestamp,
};

/// Presence Repository trait
///
/// 各メソッドは 1 回の呼び出しの中でアトミックに実行されなければならない。
/// 特に `join` と `remove` は registry と membership の両方を更新するため、
/// 他の接続のイベントから途中の状態が見えてはいけない。
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// 未参加の接続を登録
    async fn register(&self, id: ConnectionId);

    /// 接続をルームに参加させる（再参加の場合はルーム移動）
    async fn join(
        &self,
        id: &ConnectionId,
        display_name: DisplayName,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Result<JoinOutcome, RepositoryError>;

    /// 参加済みの参加者を取得
    async fn get(&self, id: &ConnectionId) -> Option<Participant>;

    /// 接続を削除し、参加していた場合は削除前の参加者を返す
    async fn remove(&self, id: &ConnectionId) -> Option<Participant>;

    /// typing フラグを更新（変化した場合のみ更新後の参加者を返す）
    async fn set_typing(
        &self,
        id: &ConnectionId,
        is_typing: bool,
    ) -> Result<Option<Participant>, RepositoryError>;

    /// 参加済みの全参加者のスナップショット
    async fn list_all(&self) -> Vec<Participant>;

    /// ルームのメンバーのスナップショット（未知のルームは空）
    async fn members(&self, room: &RoomName) -> Vec<ConnectionId>;

    /// ルームの参加者一覧
    async fn room_participants(&self, room: &RoomName) -> Vec<Participant>;

    /// 空でないルームとその人数
    async fn occupancy(&self) -> Vec<(RoomName, usize)>;

    /// 接続中（未参加を含む）の接続数
    async fn count_connections(&self) -> usize;
}
