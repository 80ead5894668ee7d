use anyhow::Context;

use tictac_duel::{
    config::{Environment, ServerConfig},
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // Initialize tracing
    // RUST_LOG overrides; development builds also log debug-level events
    let log_level = match config.environment {
        Environment::Development => "tictac_duel=debug,tower_http=info",
        Environment::Production => "tictac_duel=info,tower_http=warn",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .init();

    tracing::info!("Tic-tac-toe server starting ({:?})", config.environment);
    tracing::info!("Allowed origins: {:?}", config.allowed_origins);

    let cors = config
        .cors_layer()
        .context("Invalid CORS configuration")?;

    // Room registry lives in the shared state
    let state = AppState::new();
    let app = routes::router(state, cors);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on ws://{}/ws", addr);

    axum::serve(listener, app).await.context("Server error")?;

    tracing::info!("Shutting down game server...");
    Ok(())
}
