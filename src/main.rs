//! Taskline Server - Entry Point

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskline_server::api;
use taskline_server::state::AppState;
use taskline_server::storage::ConfigService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskline_server=info,taskline_llm=info")),
        )
        .init();

    let config = ConfigService::load()
        .context("failed to load configuration")?
        .into_config();

    let state = AppState::from_config(&config).context("failed to initialize services")?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, model = %config.model, "taskline server listening");

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("server error")?;

    info!("taskline server stopped");
    Ok(())
}
