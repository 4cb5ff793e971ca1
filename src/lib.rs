pub mod access;
pub mod api;
pub mod chat;
pub mod config;
pub mod session;

use axum::{
    Router,
    extract::FromRef,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::{access::AccessGate, chat::Lobby, config::Config};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub lobby: Lobby,
    pub gate: AccessGate,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            lobby: Lobby::new(),
            gate: AccessGate::new(config.access_phrase.clone()),
        }
    }
}

pub fn app(app_state: AppState, config: &Config) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(config.session_idle_minutes)));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true);

    Router::new()
        .route("/access", post(access::unlock))
        .merge(api::router())
        .merge(chat::router())

        .with_state(app_state)
        .layer(session_layer)
        .layer(cors)
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            self.0.to_string(),
        )
            .into_response()
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(tower_sessions::session::Error);
