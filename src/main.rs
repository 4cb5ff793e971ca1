use anyhow::Context;
use sidechat::{AppState, config::Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sidechat=info")),
        )
        .init();

    if config.access_phrase.is_none() {
        info!("no ACCESS_PHRASE set, chat is open to anyone who can reach it");
    }

    let app = sidechat::app(AppState::new(&config), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("could not bind {}", config.bind_addr()))?;
    info!(addr = %listener.local_addr()?, "sidechat v{} listening", env!("CARGO_PKG_VERSION"));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down, all chats discarded");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "could not listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
