//! # Application State and Configuration
//!
//! [`AppConfig`] is read from the environment once at startup. [`AppState`]
//! is cloned into every handler and holds the loaded [`RegionService`] and the
//! metrics registry.

use std::sync::Arc;

use thiserror::Error;

use reregion_cache::RegionService;

use crate::middleware::metrics::ApiMetrics;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default Postgres port when assembled from discrete variables.
pub const DEFAULT_DB_PORT: u16 = 5432;
/// Default connection pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Where reference data is read from.
#[derive(Clone, PartialEq, Eq)]
pub enum DataBackend {
    /// Postgres connection URL.
    Postgres { url: String, max_connections: u32 },
    /// JSON fixture file served by the in-memory data source.
    Fixture { path: String },
}

impl std::fmt::Debug for DataBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Postgres {
                max_connections, ..
            } => f
                .debug_struct("Postgres")
                .field("url", &"[REDACTED]")
                .field("max_connections", max_connections)
                .finish(),
            Self::Fixture { path } => f.debug_struct("Fixture").field("path", path).finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub backend: DataBackend,
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no data source configured: set DATABASE_URL, the RE_REGION_API_USER/RE_REGION_API_PASSWORD/RE_REGION_DB/DB_HOST variables, or REREGION_FIXTURE")]
    MissingDataSource,
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 8080)
    /// - `DATABASE_URL`, or `RE_REGION_API_USER`, `RE_REGION_API_PASSWORD`,
    ///   `RE_REGION_DB`, `DB_HOST` and `DB_PORT` (default: 5432)
    /// - `DB_MAX_CONNECTIONS` (default: 10)
    /// - `REREGION_FIXTURE`, used only when no database is configured
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let port = parse_or(get("PORT"), "PORT", DEFAULT_PORT)?;
        let max_connections =
            parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;

        let url = match get("DATABASE_URL") {
            Some(url) => Some(url),
            None => match (
                get("RE_REGION_API_USER"),
                get("RE_REGION_API_PASSWORD"),
                get("RE_REGION_DB"),
                get("DB_HOST"),
            ) {
                (Some(user), Some(password), Some(db), Some(host)) => {
                    let db_port = parse_or(get("DB_PORT"), "DB_PORT", DEFAULT_DB_PORT)?;
                    Some(format!("postgres://{user}:{password}@{host}:{db_port}/{db}"))
                }
                _ => None,
            },
        };

        let backend = match (url, get("REREGION_FIXTURE")) {
            (Some(url), _) => DataBackend::Postgres {
                url,
                max_connections,
            },
            (None, Some(path)) => DataBackend::Fixture { path },
            (None, None) => return Err(ConfigError::MissingDataSource),
        };

        Ok(Self { port, backend })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value: v }),
    }
}

/// Shared state cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<RegionService>,
    pub metrics: ApiMetrics,
}

impl AppState {
    pub fn new(service: RegionService, metrics: ApiMetrics) -> Self {
        Self {
            service: Arc::new(service),
            metrics,
        }
    }
}
