use axum::{Json, Router, debug_handler, extract::State, routing::get};

use crate::{AppState, chat::Lobby};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/users", get(users))
}

#[debug_handler]
async fn health() -> &'static str {
    "ok"
}

#[debug_handler(state = AppState)]
async fn users(State(lobby): State<Lobby>) -> Json<Vec<String>> {
    Json(lobby.online().await)
}
