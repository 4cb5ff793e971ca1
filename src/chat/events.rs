use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use super::{conversations::MessageView, registry::ConnectionId};

/// Everything a client may send over its socket. Disconnecting is implicit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    Join { username: String },
    SendMessage { to: String, text: String },
    GetConversation { peer: String },
    Typing { to: String, is_typing: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    PresenceUpdate {
        users: Vec<String>,
    },
    NotificationsUpdate {
        peers: Vec<String>,
    },
    ConversationSnapshot {
        peer: String,
        messages: Vec<MessageView>,
    },
    MessageReceived {
        from: String,
        to: String,
        text: String,
        #[serde(with = "time::serde::rfc3339")]
        timestamp: OffsetDateTime,
        is_own_message: bool,
    },
    TypingUpdate {
        from: String,
        is_typing: bool,
    },
    Rejected {
        reason: String,
    },
}

/// Why an event was refused. Unresolved senders never get one of these,
/// they are dropped without a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("a display name is required")]
    EmptyUsername,
    #[error("message text is empty")]
    EmptyText,
    #[error("a peer name is required")]
    EmptyPeer,
    #[error("that user is not online")]
    UnknownRecipient,
    #[error("messages to yourself are not delivered")]
    SelfAddressed,
    #[error("unrecognised event")]
    Malformed,
}

/// A server event addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }

    pub fn rejected(to: ConnectionId, rejection: Rejection) -> Self {
        Self::new(
            to,
            ServerEvent::Rejected {
                reason: rejection.to_string(),
            },
        )
    }
}
