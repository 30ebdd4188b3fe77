//! # Database Layer
//!
//! Reads reference data from Postgres via SQLx. The database is read-only
//! from this service's point of view; schema and data are managed elsewhere.
//!
//! Queries live in `sql/` and are embedded at compile time. Every numeric
//! column is cast to `int8` or `float8` in SQL so rows decode uniformly into
//! [`reregion_core::Value`]s.

pub mod postgres;

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

pub use postgres::PgSource;

/// Connect a pool to `url`.
pub async fn init_pool(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!(max_connections, "Connected to PostgreSQL");
    Ok(pool)
}
