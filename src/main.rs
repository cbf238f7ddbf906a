use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use spec_dispatch::config::config;
use spec_dispatch::device::UserAgentFingerprint;
use spec_dispatch::dispatch::Dispatcher;
use spec_dispatch::executor::PgExecutor;
use spec_dispatch::handlers::{self, AppState};
use spec_dispatch::spec::SpecStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SPEC_ROOT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    info!("Starting spec dispatcher in {:?} mode", config.environment);

    let store = SpecStore::load(&config.spec).context("failed to load specification documents")?;
    let executor = PgExecutor::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    executor
        .health_check()
        .await
        .context("database health check failed")?;

    let dispatcher = Dispatcher::new(Arc::new(store), Arc::new(UserAgentFingerprint::new()));
    let state = AppState::new(dispatcher, Arc::new(executor), config.auth.clone());
    let app = handlers::router(state, &config.api);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
