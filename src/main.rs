use tracing_subscriber::EnvFilter;

use student_registry::app::{router, AppState};
use student_registry::{config, database, is_production};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ADMIN_PASSWORD, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config().clone();
    tracing::info!("Starting student registry in {:?} mode", config.environment);

    if is_production!() && (config.security.admin_password.is_empty() || config.security.jwt_secret.is_empty()) {
        tracing::warn!("ADMIN_PASSWORD or JWT_SECRET not set; admin login is disabled");
    }

    let store = database::open_store(&config.database).await?;
    tracing::info!("Using {} student store", store.backend());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Student registry listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
