//! UseCase: セッションのライフサイクル制御
//!
//! 接続ごとの状態遷移 `Connected → Joined → Disconnected` を扱い、
//! Presence の更新と、その結果生じるイベントの配信先・配信内容を決める。
//! 状態を変更するのはこのコントローラだけ。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SessionController::dispatch() と各遷移（join_room / chat_message / typing / disconnect）
//!
//! ### なぜこのテストが必要か
//! - 配信対象と配信回数（送信者を含む / 除外する）がイベントごとに正しいことを保証
//! - 同じ送信元からのメッセージ順序が保たれることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加・発言・入力中通知・切断
//! - エッジケース：ルーム移動、未参加での切断、空白だけのメッセージ
//! - 異常系：未参加の接続からの発言

use std::sync::Arc;

use roka_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, DisplayName, MessageBody, MessageIdFactory, Participant,
    PresenceRepository, PusherChannel, RoomName, ServerEvent, Timestamp, TypingSignal,
};

use super::{EventBroadcaster, error::SessionError};

/// Inbound events of one connection, routed through [`SessionController::dispatch`].
#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        sender: PusherChannel,
    },
    JoinRoom {
        username: String,
        room: Option<String>,
    },
    ChatMessage {
        message: String,
    },
    Typing {
        is_typing: bool,
    },
    Disconnect,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::JoinRoom { .. } => "join_room",
            Self::ChatMessage { .. } => "chat_message",
            Self::Typing { .. } => "typing",
            Self::Disconnect => "disconnect",
        }
    }
}

/// セッションのライフサイクル制御のユースケース
pub struct SessionController {
    /// Repository（Presence へのアクセス）
    repository: Arc<dyn PresenceRepository>,
    /// イベント配信
    broadcaster: Arc<EventBroadcaster>,
    /// 時刻の取得（テストでは固定時刻）
    clock: Arc<dyn Clock>,
    message_ids: MessageIdFactory,
}

impl SessionController {
    /// 新しい SessionController を作成
    pub fn new(
        repository: Arc<dyn PresenceRepository>,
        broadcaster: Arc<EventBroadcaster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            broadcaster,
            clock,
            message_ids: MessageIdFactory::new(),
        }
    }

    /// Routes one inbound event to its transition.
    pub async fn dispatch(
        &self,
        id: &ConnectionId,
        command: SessionCommand,
    ) -> Result<(), SessionError> {
        match command {
            SessionCommand::Connect { sender } => {
                self.connect(id.clone(), sender).await;
            }
            SessionCommand::JoinRoom { username, room } => {
                self.join_room(id, username, room).await?;
            }
            SessionCommand::ChatMessage { message } => {
                self.chat_message(id, message).await?;
            }
            SessionCommand::Typing { is_typing } => {
                self.typing(id, is_typing).await?;
            }
            SessionCommand::Disconnect => {
                self.disconnect(id).await;
            }
        }
        Ok(())
    }

    /// `connect`: registers the connection (state `Connected`) and attaches its
    /// outbound channel.
    pub async fn connect(&self, id: ConnectionId, sender: PusherChannel) {
        self.broadcaster.attach(id.clone(), sender).await;
        self.repository.register(id.clone()).await;
        tracing::info!("Connection '{}' registered", id);
    }

    /// `join_room`: joins (or moves) the connection into `room`, defaulting to
    /// `general`.
    ///
    /// The room receives `user_joined` (without the joiner) and the joiner
    /// receives the `users_online` snapshot. When the join moves the connection
    /// out of another room, that room first receives `user_left`.
    pub async fn join_room(
        &self,
        id: &ConnectionId,
        username: String,
        room: Option<String>,
    ) -> Result<Participant, SessionError> {
        let display_name = DisplayName::new(username)?;
        let room = RoomName::from_optional(room);
        let joined_at = self.now();

        let outcome = self
            .repository
            .join(id, display_name, room, joined_at)
            .await?;
        let participant = outcome.participant.clone();
        tracing::info!(
            "'{}' ({}) joined room '{}'",
            participant.display_name.as_str(),
            id,
            participant.room
        );

        if let Some(previous) = &outcome.previous {
            self.end_typing(previous).await;
            if let Some(left_room) = outcome.left_room() {
                self.broadcaster
                    .broadcast_to_room(
                        left_room,
                        &ServerEvent::UserLeft(previous.clone()),
                        Some(id),
                    )
                    .await;
            }
        }

        self.broadcaster
            .broadcast_to_room(
                &participant.room,
                &ServerEvent::UserJoined(participant.clone()),
                Some(id),
            )
            .await;

        let online = self.repository.list_all().await;
        self.broadcaster
            .send_to_connection(id, &ServerEvent::UsersOnline(online))
            .await;

        Ok(participant)
    }

    /// `chat_message`: relays a message to every member of the sender's room,
    /// sender included.
    ///
    /// The room and author name come from the registry, never from the client.
    pub async fn chat_message(
        &self,
        id: &ConnectionId,
        message: String,
    ) -> Result<ChatMessage, SessionError> {
        let participant = self.joined_participant(id).await?;
        let body = MessageBody::new(message)?;

        let sent_at = self.now();
        let chat_message = ChatMessage::new(
            self.message_ids.next(id, sent_at),
            participant.display_name,
            body,
            sent_at,
        );
        tracing::debug!(
            "Relaying message '{}' to room '{}'",
            chat_message.id,
            participant.room
        );

        self.broadcaster
            .broadcast_to_room(
                &participant.room,
                &ServerEvent::ChatMessage(chat_message.clone()),
                None,
            )
            .await;

        Ok(chat_message)
    }

    /// `typing`: relays the typing state to the rest of the room.
    ///
    /// Returns `false` when the state did not change, in which case nothing is
    /// broadcast.
    pub async fn typing(&self, id: &ConnectionId, is_typing: bool) -> Result<bool, SessionError> {
        let Some(participant) = self.repository.set_typing(id, is_typing).await? else {
            return Ok(false);
        };

        let signal = TypingSignal::new(participant.display_name, is_typing);
        self.broadcaster
            .broadcast_to_room(&participant.room, &ServerEvent::UserTyping(signal), Some(id))
            .await;
        Ok(true)
    }

    /// `disconnect`: destroys the connection's state. A joined participant's room
    /// receives `user_left`; an unjoined connection leaves silently.
    pub async fn disconnect(&self, id: &ConnectionId) -> Option<Participant> {
        self.broadcaster.detach(id).await;

        let Some(participant) = self.repository.remove(id).await else {
            tracing::info!("Connection '{}' closed before joining", id);
            return None;
        };
        tracing::info!(
            "'{}' ({}) left room '{}'",
            participant.display_name.as_str(),
            id,
            participant.room
        );

        self.end_typing(&participant).await;
        self.broadcaster
            .broadcast_to_room(
                &participant.room,
                &ServerEvent::UserLeft(participant.clone()),
                Some(id),
            )
            .await;

        Some(participant)
    }

    async fn joined_participant(&self, id: &ConnectionId) -> Result<Participant, SessionError> {
        self.repository
            .get(id)
            .await
            .ok_or_else(|| SessionError::NotJoined(id.to_string()))
    }

    /// Clears a typing indicator the participant left behind in its room.
    async fn end_typing(&self, participant: &Participant) {
        if !participant.is_typing {
            return;
        }
        let signal = TypingSignal::new(participant.display_name.clone(), false);
        self.broadcaster
            .broadcast_to_room(
                &participant.room,
                &ServerEvent::UserTyping(signal),
                Some(&participant.id),
            )
            .await;
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
