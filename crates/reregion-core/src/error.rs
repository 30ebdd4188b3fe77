//! # Error Types
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - [`SourceError`] is what the data source reports: empty result sets,
//!   connectivity failures, failed queries.
//! - [`RowError`] is a positional column that is missing or of the wrong type.
//! - [`RegionError`] is what cache lookups and entity assembly report. It keeps
//!   the entity type and identifier for not-found results so the boundary can
//!   log and respond meaningfully.
//!
//! Every type exposes `kind()`. The boundary maps [`ErrorKind::NotFound`] to
//! 404, [`ErrorKind::Ambiguous`] to 400 and [`ErrorKind::Internal`] to 500.

use std::fmt;

use thiserror::Error;

/// The error kinds the boundary distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The requested identifier or metric is absent from the reference data.
    NotFound,
    /// A name matches more than one entity; the caller must use an id.
    Ambiguous,
    /// Load failure, serialization failure, or a broken cache invariant.
    Internal,
}

/// Entity types named in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    State,
    StateTax,
    County,
    CountyTax,
    Metric,
    FederalTax,
}

impl EntityKind {
    /// Return the human-readable name used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::StateTax => "state tax info",
            Self::County => "county",
            Self::CountyTax => "county tax info",
            Self::Metric => "metric",
            Self::FederalTax => "federal tax info",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The datasets the data source serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    StateCensus,
    StateTax,
    FederalTax,
    County,
    CountyList,
    MetricNames,
}

impl Dataset {
    /// Return the dataset name used in log fields and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateCensus => "state census",
            Self::StateTax => "state tax",
            Self::FederalTax => "federal tax",
            Self::County => "county",
            Self::CountyList => "county list",
            Self::MetricNames => "metric names",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a data source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    /// The query succeeded but returned zero rows.
    #[error("no rows returned for {dataset}")]
    NoRows { dataset: Dataset },

    /// A county list was requested for a metric outside the valid set.
    #[error("metric {0} is not in the valid metric set")]
    UnknownMetric(String),

    /// The data source could not be reached.
    #[error("cannot connect to the data source: {0}")]
    Connection(String),

    /// The query could not be executed.
    #[error("query for {dataset} failed: {message}")]
    Query { dataset: Dataset, message: String },

    /// A returned column could not be decoded into a row value.
    #[error("could not decode {dataset} row: {message}")]
    Decode { dataset: Dataset, message: String },

    /// A fixture file could not be read or parsed.
    #[error("invalid fixture: {0}")]
    Fixture(String),
}

impl SourceError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRows { .. } | Self::UnknownMetric(_) => ErrorKind::NotFound,
            Self::Connection(_)
            | Self::Query { .. }
            | Self::Decode { .. }
            | Self::Fixture(_) => ErrorKind::Internal,
        }
    }
}

/// A positional column could not be read with the requested type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("column {index} is missing (row has {len} columns)")]
    MissingColumn { index: usize, len: usize },

    #[error("column {index}: expected {expected}, found {found}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Error from reference lookups, cache construction, and entity assembly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// The requested identifier is absent from the loaded reference data.
    #[error("{entity} {key} not found")]
    NotFound { entity: EntityKind, key: String },

    /// A name key matches several entities. `ids` is ascending.
    #[error("{entity} name {key} matches {} entries ({}); request it by id", .ids.len(), join_ids(.ids))]
    Ambiguous {
        entity: EntityKind,
        key: String,
        ids: Vec<i64>,
    },

    /// The federal regime was never loaded.
    #[error("the federal tax cache is empty")]
    EmptyFederalCache,

    /// A regime finished loading with no brackets for a filing variant.
    #[error("{regime} {variant} bracket list is empty")]
    EmptyBrackets {
        regime: String,
        variant: &'static str,
    },

    /// A row from the data source did not have the documented shape.
    #[error("malformed {dataset} row {row}: {source}")]
    MalformedRow {
        dataset: Dataset,
        row: usize,
        #[source]
        source: RowError,
    },

    /// The data source failed.
    #[error("data source failure: {0}")]
    Source(#[from] SourceError),

    /// Cross-references between datasets do not line up.
    #[error("inconsistent reference data: {0}")]
    Inconsistent(String),

    /// An assembled entity could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl RegionError {
    /// Shorthand for a not-found error.
    pub fn not_found(entity: EntityKind, key: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Classify this error.
    ///
    /// Only [`RegionError::NotFound`] is a not-found result. A wrapped
    /// [`SourceError`] is always internal here: callers that expect an empty
    /// result for a specific key translate it into `NotFound` with the entity
    /// context before it reaches this type.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
            _ => ErrorKind::Internal,
        }
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<serde_json::Error> for RegionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
