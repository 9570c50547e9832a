//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{DomainError, PresenceError, RepositoryError};

/// セッション操作のエラー
///
/// いずれもクライアントには返さず、UI 層でログに残して破棄する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// 接続レジストリに存在しない接続からのイベント
    #[error("connection '{0}' is not registered")]
    UnknownConnection(String),

    /// ルーム参加前の chat_message / typing
    #[error("connection '{0}' has not joined a room")]
    NotJoined(String),

    /// 空のメッセージ本文など、ペイロードの検証エラー
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] DomainError),
}

impl From<RepositoryError> for SessionError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Presence(PresenceError::UnknownConnection(id)) => {
                Self::UnknownConnection(id)
            }
            RepositoryError::Presence(PresenceError::NotJoined(id)) => Self::NotJoined(id),
        }
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("room '{0}' has no members")]
    RoomNotFound(String),
}
