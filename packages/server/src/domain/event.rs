//! Events the relay emits to connected clients.

use super::{ChatMessage, Participant, TypingSignal};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    ChatMessage(ChatMessage),
    UserJoined(Participant),
    UserLeft(Participant),
    UsersOnline(Vec<Participant>),
    UserTyping(TypingSignal),
}

impl ServerEvent {
    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatMessage(_) => "chat_message",
            Self::UserJoined(_) => "user_joined",
            Self::UserLeft(_) => "user_left",
            Self::UsersOnline(_) => "users_online",
            Self::UserTyping(_) => "user_typing",
        }
    }
}
