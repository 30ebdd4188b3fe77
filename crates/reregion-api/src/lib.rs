//! # reregion-api
//!
//! HTTP service for state and county tax liability, built on Axum/Tower/Tokio.
//!
//! ## Endpoints
//!
//! | Path | Parameters | Response |
//! |------|------------|----------|
//! | `/states` | `id` or `name`, `fs`, `dep`, `income` | state metrics and liability |
//! | `/counties` | `id` or `name`, `fs`, `res`, `dep`, `income` | county metrics and per-locale liability |
//! | `/state-list` | `metric_name`, `size`, `desc` | states ranked by a census metric |
//! | `/county-list` | `metric_name`, `size`, `desc` | counties ranked by a census metric |
//! | `/state-taxes` | `id` or `name` | state tax schedule |
//! | `/county-taxes` | `id` or `name` | county tax locales |
//! | `/federal-taxes` | | federal tax schedule |
//! | `/health` | | liveness and load statistics |
//! | `/metrics` | | Prometheus text exposition |
//!
//! Reference data is loaded once at startup into a [`reregion_cache::RegionService`];
//! see [`state::AppState`].

pub mod db;
pub mod error;
pub mod middleware;
pub mod params;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use reregion_cache::ServiceStats;

use crate::middleware::metrics::metrics_middleware;
use crate::state::AppState;

/// Assemble the application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    Router::new()
        .merge(routes::geo::router())
        .merge(routes::lists::router())
        .merge(routes::taxes::router())
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthBody {
    message: &'static str,
    stats: ServiceStats,
}

async fn health(State(state): State<AppState>) -> Json<HealthBody> {
    Json(HealthBody {
        message: "API is healthy",
        stats: state.service.stats(),
    })
}

/// Refresh the cache gauges, then encode the registry.
async fn prometheus_metrics(State(state): State<AppState>) -> Response {
    let stats = state.service.stats();
    state
        .metrics
        .counties_cached()
        .set(i64::try_from(stats.counties_cached).unwrap_or(i64::MAX));
    state
        .metrics
        .states_loaded()
        .set(i64::try_from(stats.states).unwrap_or(i64::MAX));

    match state.metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
