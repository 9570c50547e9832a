//! Conversion logic between DTOs and domain entities.

use roka_shared::time::timestamp_to_rfc3339;

use crate::domain::{ChatMessage, Participant, ServerEvent, TypingSignal};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&ChatMessage> for dto::ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            username: model.author.as_str().to_string(),
            message: model.body.as_str().to_string(),
            timestamp: model.sent_at.value(),
        }
    }
}

impl From<&TypingSignal> for dto::UserTypingDto {
    fn from(model: &TypingSignal) -> Self {
        Self {
            username: model.display_name.as_str().to_string(),
            is_typing: model.is_typing,
        }
    }
}

impl dto::UserDto {
    fn from_participant(model: &Participant, is_online: bool) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            username: model.display_name.as_str().to_string(),
            is_online,
        }
    }
}

impl From<&ServerEvent> for dto::ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::ChatMessage(message) => Self::ChatMessage(message.into()),
            ServerEvent::UserJoined(participant) => {
                Self::UserJoined(dto::UserDto::from_participant(participant, true))
            }
            // The departing participant is gone by the time this is delivered.
            ServerEvent::UserLeft(participant) => {
                Self::UserLeft(dto::UserDto::from_participant(participant, false))
            }
            ServerEvent::UsersOnline(participants) => Self::UsersOnline(
                participants
                    .iter()
                    .map(|participant| dto::UserDto::from_participant(participant, true))
                    .collect(),
            ),
            ServerEvent::UserTyping(signal) => Self::UserTyping(signal.into()),
        }
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&Participant> for http::ParticipantDetailDto {
    fn from(model: &Participant) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            username: model.display_name.as_str().to_string(),
            is_online: true,
            joined_at: timestamp_to_rfc3339(model.joined_at.value()),
            is_typing: model.is_typing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionId, DisplayName, MessageBody, MessageIdFactory, RoomName, Timestamp,
    };

    fn participant() -> Participant {
        Participant::new(
            ConnectionId::new("c1".to_string()).unwrap(),
            DisplayName::new("alice".to_string()).unwrap(),
            RoomName::default(),
            Timestamp::new(1672531200000),
        )
    }

    #[test]
    fn test_chat_message_to_dto() {
        // テスト項目: ドメインの ChatMessage が DTO に変換される
        // given (前提条件):
        let author = ConnectionId::new("c1".to_string()).unwrap();
        let sent_at = Timestamp::new(2000);
        let message = ChatMessage::new(
            MessageIdFactory::new().next(&author, sent_at),
            DisplayName::new("alice".to_string()).unwrap(),
            MessageBody::new("Hi!".to_string()).unwrap(),
            sent_at,
        );

        // when (操作):
        let dto: dto::ChatMessageDto = (&message).into();

        // then (期待する結果):
        assert_eq!(dto.id, "c1-2000-0");
        assert_eq!(dto.username, "alice");
        assert_eq!(dto.message, "Hi!");
        assert_eq!(dto.timestamp, 2000);
    }

    #[test]
    fn test_presence_events_carry_online_flag() {
        // テスト項目: user_joined は isOnline=true、user_left は isOnline=false になる
        // given (前提条件):
        let joined = ServerEvent::UserJoined(participant());
        let left = ServerEvent::UserLeft(participant());

        // when (操作):
        let joined_dto = dto::ServerMessage::from(&joined);
        let left_dto = dto::ServerMessage::from(&left);

        // then (期待する結果):
        let expected = |is_online| dto::UserDto {
            id: "c1".to_string(),
            username: "alice".to_string(),
            is_online,
        };
        assert_eq!(joined_dto, dto::ServerMessage::UserJoined(expected(true)));
        assert_eq!(left_dto, dto::ServerMessage::UserLeft(expected(false)));
    }

    #[test]
    fn test_participant_to_http_detail() {
        // テスト項目: 参加者が HTTP 詳細 DTO に変換され、参加時刻が RFC 3339 になる
        // given (前提条件):
        let model = participant();

        // when (操作):
        let dto: http::ParticipantDetailDto = (&model).into();

        // then (期待する結果):
        assert_eq!(dto.id, "c1");
        assert!(dto.is_online);
        assert_eq!(dto.joined_at.as_deref(), Some("2023-01-01T00:00:00+00:00"));
        assert!(!dto.is_typing);
    }

    #[test]
    fn test_participant_detail_json_shape() {
        // テスト項目: HTTP 詳細 DTO が camelCase の JSON（isOnline を含む）になる
        // given (前提条件):
        let dto = http::ParticipantDetailDto::from(&participant());

        // when (操作):
        let json = serde_json::to_value(&dto).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            serde_json::json!({
                "id": "c1",
                "username": "alice",
                "isOnline": true,
                "joinedAt": "2023-01-01T00:00:00+00:00",
                "isTyping": false,
            })
        );
    }
}
