//! # Data Source Contract
//!
//! The caches are filled from an opaque data source that returns flat
//! positional rows. Each dataset has a fixed column layout, recorded in
//! [`columns`]. Implementations must:
//!
//! - return rows of a homogeneous shape per call,
//! - report an empty result as [`SourceError::NoRows`],
//! - report connectivity and execution failures as internal errors.
//!
//! Two implementations exist: the Postgres source in `reregion-api` and
//! [`crate::memory::MemorySource`].

use std::collections::BTreeSet;

use async_trait::async_trait;

use reregion_core::{Row, SourceError};

/// Loads raw reference rows.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// One row per state. Layout: [`columns::census`].
    async fn load_state_census(&self) -> Result<Vec<Row>, SourceError>;

    /// One row per state bracket. Layout: [`columns::state_tax`].
    async fn load_state_tax(&self) -> Result<Vec<Row>, SourceError>;

    /// One row per federal bracket. Layout: [`columns::federal_tax`].
    async fn load_federal_tax(&self) -> Result<Vec<Row>, SourceError>;

    /// One row per locale of the county. Layout: [`columns::county`].
    async fn load_county_by_id(&self, county_id: i64) -> Result<Vec<Row>, SourceError>;

    /// Same as [`DataSource::load_county_by_id`], keyed by the normalized
    /// county name (see `reregion_core::names::normalize_county_name`).
    async fn load_county_by_name(&self, county_name: &str) -> Result<Vec<Row>, SourceError>;

    /// Up to `n` counties ordered by `metric`. Layout: [`columns::county_list`].
    ///
    /// Fails with [`SourceError::UnknownMetric`] when `metric` is outside the
    /// set returned by [`DataSource::load_metric_names`].
    async fn load_county_list(
        &self,
        metric: &str,
        n: usize,
        desc: bool,
    ) -> Result<Vec<Row>, SourceError>;

    /// Metric names accepted by [`DataSource::load_county_list`].
    async fn load_metric_names(&self) -> Result<BTreeSet<String>, SourceError>;
}

/// Column indices per dataset.
pub mod columns {
    pub mod census {
        pub const STATE_ID: usize = 0;
        pub const STATE_NAME: usize = 1;
        pub const POP: usize = 2;
        pub const MALE_POP: usize = 3;
        pub const FEMALE_POP: usize = 4;
        pub const MEDIAN_INCOME: usize = 5;
        pub const AVERAGE_RENT: usize = 6;
        pub const COMMUTE: usize = 7;
    }

    pub mod state_tax {
        pub const STATE_ID: usize = 0;
        pub const STATE_NAME: usize = 1;
        pub const SINGLE_DEDUCTION: usize = 2;
        pub const MARRIED_DEDUCTION: usize = 3;
        pub const SINGLE_EXEMPTION: usize = 4;
        pub const MARRIED_EXEMPTION: usize = 5;
        pub const DEPENDENT_EXEMPTION: usize = 6;
        pub const SINGLE_RATE: usize = 7;
        pub const SINGLE_BRACKET: usize = 8;
        pub const MARRIED_RATE: usize = 9;
        pub const MARRIED_BRACKET: usize = 10;
    }

    /// Deductions repeat on every row; the first row is authoritative.
    pub mod federal_tax {
        pub const RATE: usize = 0;
        pub const SINGLE_BRACKET: usize = 1;
        pub const MARRIED_BRACKET: usize = 2;
        pub const HEAD_BRACKET: usize = 3;
        pub const SINGLE_DEDUCTION: usize = 4;
        pub const MARRIED_DEDUCTION: usize = 5;
        pub const HEAD_DEDUCTION: usize = 6;
    }

    /// County identity and census columns repeat on every locale row.
    pub mod county {
        pub const COUNTY_ID: usize = 0;
        pub const COUNTY_NAME: usize = 1;
        pub const STATE_ID: usize = 2;
        pub const POP: usize = 3;
        pub const MALE_POP: usize = 4;
        pub const FEMALE_POP: usize = 5;
        pub const MEDIAN_INCOME: usize = 6;
        pub const AVERAGE_RENT: usize = 7;
        pub const COMMUTE: usize = 8;
        pub const LOCALE_ID: usize = 9;
        pub const LOCALE_NAME: usize = 10;
        pub const RESIDENT_DESC: usize = 11;
        pub const RESIDENT_RATE: usize = 12;
        pub const RESIDENT_MONTH_FEE: usize = 13;
        pub const RESIDENT_YEAR_FEE: usize = 14;
        pub const RESIDENT_PAY_PERIOD_FEE: usize = 15;
        pub const RESIDENT_STATE_RATE: usize = 16;
        pub const NONRESIDENT_DESC: usize = 17;
        pub const NONRESIDENT_RATE: usize = 18;
        pub const NONRESIDENT_MONTH_FEE: usize = 19;
        pub const NONRESIDENT_YEAR_FEE: usize = 20;
        pub const NONRESIDENT_PAY_PERIOD_FEE: usize = 21;
        pub const NONRESIDENT_STATE_RATE: usize = 22;
        pub const WIDTH: usize = 23;
    }

    pub mod county_list {
        pub const COUNTY_ID: usize = 0;
        pub const COUNTY_NAME: usize = 1;
        pub const STATE_ID: usize = 2;
        pub const METRIC_VALUE: usize = 3;
    }
}
