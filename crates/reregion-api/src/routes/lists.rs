//! # Ranked Lists
//!
//! - **GET `/state-list?metric_name&size&desc`**: served from the ranked list
//!   cache.
//! - **GET `/county-list?metric_name&size&desc`**: queried from the data
//!   source on every request.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use reregion_cache::{CountyList, StateList};

use crate::error::AppError;
use crate::params::ListQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state-list", get(get_state_list))
        .route("/county-list", get(get_county_list))
}

async fn get_state_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<StateList>, AppError> {
    let req = query.validate()?;
    tracing::info!(metric = %req.metric, size = req.size, desc = req.desc, "getting state list");
    Ok(Json(state.service.state_list(&req.metric, req.size, req.desc)?))
}

async fn get_county_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<CountyList>, AppError> {
    let req = query.validate()?;
    tracing::info!(metric = %req.metric, size = req.size, desc = req.desc, "getting county list");
    let list = state
        .service
        .county_list(&req.metric, req.size, req.desc)
        .await?;
    Ok(Json(list))
}
