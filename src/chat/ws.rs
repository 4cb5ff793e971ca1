use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tower_sessions::Session;
use tracing::{debug, warn};

use crate::{AppResult, AppState, access::AccessGate};

use super::{
    events::{ClientEvent, Rejection},
    lobby::Lobby,
};

#[debug_handler(state = AppState)]
pub(crate) async fn chat_ws(
    State(lobby): State<Lobby>,
    State(gate): State<AccessGate>,
    session: Session,

    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    if !gate.admits(&session).await? {
        return Ok(StatusCode::FORBIDDEN.into_response());
    }

    Ok(ws.on_upgrade(move |stream| serve_connection(stream, lobby)))
}

async fn serve_connection(stream: WebSocket, lobby: Lobby) {
    let (connection, mut outbox) = lobby.connect().await;
    let (mut sender, mut receiver) = stream.split();
    debug!(%connection, "socket opened");

    let mut outbox_task = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(err) => {
                    warn!(%err, "could not encode server event");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(_) | Message::Binary(_) => {}
            Message::Close(_) => break,
            _ => continue,
        }

        match serde_json::from_slice::<ClientEvent>(&msg.into_data()) {
            Ok(event) => lobby.dispatch(connection, event).await,
            Err(err) => {
                debug!(%connection, %err, "unreadable frame");
                lobby.reject(connection, Rejection::Malformed).await;
            }
        }

        if outbox_task.is_finished() {
            break;
        }
    }

    lobby.disconnect(connection).await;
    debug!(%connection, "socket closed");

    // the outbox sender was dropped on disconnect, so the task is flushing what is left
    tokio::select! {
        _ = &mut outbox_task => {},
        _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => outbox_task.abort(),
    };
}
