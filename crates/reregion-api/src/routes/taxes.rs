//! # Tax Schedules
//!
//! - **GET `/state-taxes?id|name`**: a state's deductions, exemptions and
//!   brackets.
//! - **GET `/county-taxes?id|name`**: every tax locale of a county.
//! - **GET `/federal-taxes`**: federal deductions and brackets.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use reregion_cache::CountyTaxList;
use reregion_tax::{FederalTaxInfo, StateTaxInfo};

use crate::error::AppError;
use crate::params::{GeoKey, KeyQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state-taxes", get(get_state_taxes))
        .route("/county-taxes", get(get_county_taxes))
        .route("/federal-taxes", get(get_federal_taxes))
}

async fn get_state_taxes(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<StateTaxInfo>, AppError> {
    let key = query.validate("state")?;
    tracing::info!(state = %key, "getting state tax info");
    let info = match &key {
        GeoKey::Id(id) => state.service.state_tax_by_id(*id)?,
        GeoKey::Name(name) => state.service.state_tax_by_name(name)?,
    };
    Ok(Json(info.clone()))
}

async fn get_county_taxes(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Json<CountyTaxList>, AppError> {
    let key = query.validate("county")?;
    tracing::info!(county = %key, "getting county tax info");
    let list = match &key {
        GeoKey::Id(id) => state.service.county_tax_by_id(*id).await?,
        GeoKey::Name(name) => state.service.county_tax_by_name(name).await?,
    };
    Ok(Json(list))
}

async fn get_federal_taxes(State(state): State<AppState>) -> Result<Json<FederalTaxInfo>, AppError> {
    tracing::info!("getting federal tax info");
    Ok(Json(state.service.federal_tax()?.clone()))
}
