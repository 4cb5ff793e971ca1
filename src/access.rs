use std::sync::Arc;

use axum::{Form, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::info;

use crate::{AppResult, AppState, session::ACCESS_GRANTED};

/// Shared access phrase guarding the chat socket. Without a phrase the gate
/// stands open.
#[derive(Clone, Debug, Default)]
pub struct AccessGate {
    phrase: Option<Arc<str>>,
}

impl AccessGate {
    pub fn new(phrase: Option<String>) -> Self {
        Self {
            phrase: phrase.map(Arc::from),
        }
    }

    pub fn is_open(&self) -> bool {
        self.phrase.is_none()
    }

    pub fn accepts(&self, attempt: &str) -> bool {
        match &self.phrase {
            Some(phrase) => attempt.trim() == &**phrase,
            None => true,
        }
    }

    pub async fn admits(&self, session: &Session) -> AppResult<bool> {
        if self.is_open() {
            return Ok(true);
        }
        Ok(session.get::<bool>(ACCESS_GRANTED).await?.unwrap_or(false))
    }
}

#[derive(Deserialize)]
pub(crate) struct UnlockForm {
    phrase: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn unlock(
    State(gate): State<AccessGate>,
    session: Session,

    Form(UnlockForm { phrase }): Form<UnlockForm>,
) -> AppResult<StatusCode> {
    if !gate.accepts(&phrase) {
        info!("wrong access phrase");
        return Ok(StatusCode::FORBIDDEN);
    }

    session.insert(ACCESS_GRANTED, true).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_gate_accepts_anything() {
        let gate = AccessGate::new(None);
        assert!(gate.is_open());
        assert!(gate.accepts(""));
    }

    #[test]
    fn closed_gate_wants_the_phrase() {
        let gate = AccessGate::new(Some("5920".into()));
        assert!(!gate.is_open());
        assert!(gate.accepts("5920"));
        assert!(gate.accepts(" 5920 "));
        assert!(!gate.accepts("592"));
        assert!(!gate.accepts(""));
    }
}
