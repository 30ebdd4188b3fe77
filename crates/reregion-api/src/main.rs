//! # reregion-api binary
//!
//! Loads reference data from Postgres (or a JSON fixture) and serves the API
//! on the configured port (default 8080).

use std::sync::Arc;

use reregion_api::db::{self, PgSource};
use reregion_api::middleware::metrics::ApiMetrics;
use reregion_api::state::{AppConfig, AppState, DataBackend};
use reregion_cache::{DataSource, MemorySource, RegionService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env()?;
    tracing::info!(backend = ?config.backend, port = config.port, "configuration loaded");

    let source: Arc<dyn DataSource> = match &config.backend {
        DataBackend::Postgres {
            url,
            max_connections,
        } => {
            let pool = db::init_pool(url, *max_connections).await.map_err(|e| {
                tracing::error!("Database initialization failed: {e}");
                e
            })?;
            Arc::new(PgSource::new(pool))
        }
        DataBackend::Fixture { path } => Arc::new(MemorySource::from_path(path)?),
    };

    let service = RegionService::load(source).await.map_err(|e| {
        tracing::error!("Reference data load failed: {e}");
        e
    })?;
    let metrics = ApiMetrics::new()?;
    let app = reregion_api::app(AppState::new(service, metrics));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Re-Region API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
