use anyhow::Context;
use axum::http::HeaderValue;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ORIGINS: &str = "http://localhost:3000";
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub port: u16,
    /// Shared phrase needed before opening the chat socket. `None` leaves it open.
    pub access_phrase: Option<String>,
    pub allowed_origins: Vec<HeaderValue>,
    pub session_idle_minutes: i64,
}

impl Config {
    /// Reads the process environment after loading `.env`, if there is one.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(port) => port.trim().parse::<u16>().with_context(|| format!("PORT={port} is not a port"))?,
            None => DEFAULT_PORT,
        };

        let session_idle_minutes = match var("SESSION_IDLE_MINUTES") {
            Some(minutes) => minutes
                .trim()
                .parse()
                .ok()
                .filter(|minutes: &i64| *minutes > 0)
                .with_context(|| format!("SESSION_IDLE_MINUTES={minutes} is not a positive number"))?,
            None => DEFAULT_SESSION_IDLE_MINUTES,
        };

        let allowed_origins = var("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ORIGINS.to_owned())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(|origin| {
                HeaderValue::from_str(origin).with_context(|| format!("bad origin in ALLOWED_ORIGINS: {origin}"))
            })
            .collect::<anyhow::Result<_>>()?;

        Ok(Config {
            bind_address: var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port,
            access_phrase: var("ACCESS_PHRASE"),
            allowed_origins,
            session_idle_minutes,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
