//! # State and County Liability
//!
//! - **GET `/states?id|name&fs&dep&income`**: census metrics with state,
//!   federal and total liability.
//! - **GET `/counties?id|name&fs&res&dep&income`**: census metrics with one
//!   liability entry per tax locale.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use reregion_cache::{County, State as StateEntity};

use crate::error::AppError;
use crate::params::{GeoKey, GeoQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/states", get(get_state))
        .route("/counties", get(get_county))
}

async fn get_state(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<StateEntity>, AppError> {
    let req = query.validate("state", false)?;
    tracing::info!(state = %req.key, status = %req.filing.status, "getting state");
    let entity = match &req.key {
        GeoKey::Id(id) => state.service.state_by_id(*id, &req.filing)?,
        GeoKey::Name(name) => state.service.state_by_name(name, &req.filing)?,
    };
    Ok(Json(entity))
}

async fn get_county(
    State(state): State<AppState>,
    Query(query): Query<GeoQuery>,
) -> Result<Json<County>, AppError> {
    let req = query.validate("county", true)?;
    tracing::info!(county = %req.key, status = %req.filing.status, "getting county");
    let entity = match &req.key {
        GeoKey::Id(id) => state.service.county_by_id(*id, &req.filing).await?,
        GeoKey::Name(name) => state.service.county_by_name(name, &req.filing).await?,
    };
    Ok(Json(entity))
}
