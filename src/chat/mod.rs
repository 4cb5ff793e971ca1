mod conversations;
mod events;
mod hub;
mod lobby;
mod notifications;
mod presence;
mod registry;
mod typing;
mod ws;

use axum::{routing::get, Router};

use crate::AppState;

pub use conversations::{Author, Conversation, ConversationStore, Message, MessageView};
pub use events::{ClientEvent, Outbound, Rejection, ServerEvent};
pub use hub::Hub;
pub use lobby::{Lobby, Outbox};
pub use notifications::NotificationTracker;
pub use registry::{ConnectionId, Departure, Registration, Registry};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::chat_ws))
}
