//! # API Route Modules
//!
//! - `geo`: liability for one state or county (`/states`, `/counties`).
//! - `lists`: ranked lists of states and counties by census metric.
//! - `taxes`: raw tax schedules (`/state-taxes`, `/county-taxes`,
//!   `/federal-taxes`).
//!
//! All endpoints are GET; axum answers HEAD on the same routes without a body.

pub mod geo;
pub mod lists;
pub mod taxes;
