//! ドメイン層のエラー定義

use thiserror::Error;

/// Value Object の生成に失敗した場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("message body must not be empty")]
    EmptyMessageBody,
}

/// Presence（接続レジストリ + ルーム所属）の状態遷移エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    /// 接続レジストリに存在しない接続
    #[error("connection '{0}' is not registered")]
    UnknownConnection(String),

    /// 登録済みだがまだルームに参加していない接続
    #[error("connection '{0}' has not joined a room")]
    NotJoined(String),
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Presence(#[from] PresenceError),
}

/// メッセージ送信（通知）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' is not attached")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}
