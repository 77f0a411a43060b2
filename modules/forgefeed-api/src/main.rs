use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use forgefeed_api::{build_router, AppState};
use forgefeed_common::Config;
use forgefeed_events::PgEventStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("forgefeed=info".parse()?))
        .init();

    let config = Config::from_env();

    // Lazy pool: the service comes up even when Postgres is down, and the
    // store reports Unavailable until connectivity returns.
    let store = PgEventStore::connect_lazy(&config.database_url)?;
    if let Err(e) = store.ensure_schema().await {
        warn!(error = %e, "schema setup failed; store queries will fail until Postgres is reachable");
    }

    let state = Arc::new(AppState {
        store: Arc::new(store),
    });

    let addr = format!("{}:{}", config.host, config.port);
    info!("forgefeed API starting on {addr}");
    info!("webhook receiver at http://{addr}/webhook");
    info!("activity feed at http://{addr}/api/events");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
