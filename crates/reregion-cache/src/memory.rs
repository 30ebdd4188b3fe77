//! # In-Memory Data Source
//!
//! A [`DataSource`] backed by rows held in memory. Used by tests and by the
//! server's fixture mode, where the rows are read from a JSON file:
//!
//! ```json
//! {
//!   "state_census": [[36, "New York", 18466230, 8953064, 9513166, 77578, 1381, 17]],
//!   "state_tax":    [[36, "New York", 2500, 7500, 1500, 3000, 1000, 0.02, 0, 0.02, 0]],
//!   "federal_tax":  [[0.10, 0, 0, 0, 12950, 25900, 19400]],
//!   "counties":     [[36061, "New York County", 36, ...]],
//!   "metric_names": ["pop", "commute"]
//! }
//! ```
//!
//! Every field is optional. A missing dataset behaves like an empty table.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use reregion_core::names::normalize_county_name;
use reregion_core::row::{read_int, read_text};
use reregion_core::{Dataset, Row, SourceError, Value};

use crate::census::CensusMetric;
use crate::source::columns::county as col;
use crate::source::DataSource;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySource {
    #[serde(default)]
    state_census: Vec<Row>,
    #[serde(default)]
    state_tax: Vec<Row>,
    #[serde(default)]
    federal_tax: Vec<Row>,
    /// County layout, one row per locale.
    #[serde(default)]
    counties: Vec<Row>,
    #[serde(default)]
    metric_names: BTreeSet<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state_census(mut self, rows: Vec<Row>) -> Self {
        self.state_census = rows;
        self
    }

    pub fn with_state_tax(mut self, rows: Vec<Row>) -> Self {
        self.state_tax = rows;
        self
    }

    pub fn with_federal_tax(mut self, rows: Vec<Row>) -> Self {
        self.federal_tax = rows;
        self
    }

    pub fn with_counties(mut self, rows: Vec<Row>) -> Self {
        self.counties = rows;
        self
    }

    pub fn with_metric_names(mut self, names: BTreeSet<String>) -> Self {
        self.metric_names = names;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        serde_json::from_str(json).map_err(|e| SourceError::Fixture(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Fixture(format!("{}: {e}", path.display())))?;
        let source = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            states = source.state_census.len(),
            counties = source.county_ids().len(),
            "loaded fixture data source"
        );
        Ok(source)
    }

    fn county_ids(&self) -> HashSet<i64> {
        self.counties
            .iter()
            .filter_map(|row| read_int(row, col::COUNTY_ID).ok())
            .collect()
    }

    fn county_rows(&self, matches: impl Fn(&Row) -> bool) -> Result<Vec<Row>, SourceError> {
        non_empty(
            Dataset::County,
            self.counties.iter().filter(|r| matches(r)).cloned().collect(),
        )
    }
}

fn non_empty(dataset: Dataset, rows: Vec<Row>) -> Result<Vec<Row>, SourceError> {
    if rows.is_empty() {
        Err(SourceError::NoRows { dataset })
    } else {
        Ok(rows)
    }
}

fn decode_error(e: reregion_core::RowError) -> SourceError {
    SourceError::Decode {
        dataset: Dataset::CountyList,
        message: e.to_string(),
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn load_state_census(&self) -> Result<Vec<Row>, SourceError> {
        non_empty(Dataset::StateCensus, self.state_census.clone())
    }

    async fn load_state_tax(&self) -> Result<Vec<Row>, SourceError> {
        non_empty(Dataset::StateTax, self.state_tax.clone())
    }

    async fn load_federal_tax(&self) -> Result<Vec<Row>, SourceError> {
        non_empty(Dataset::FederalTax, self.federal_tax.clone())
    }

    async fn load_county_by_id(&self, county_id: i64) -> Result<Vec<Row>, SourceError> {
        self.county_rows(|row| read_int(row, col::COUNTY_ID).ok() == Some(county_id))
    }

    async fn load_county_by_name(&self, county_name: &str) -> Result<Vec<Row>, SourceError> {
        let key = normalize_county_name(county_name);
        self.county_rows(|row| {
            read_text(row, col::COUNTY_NAME)
                .map(|name| normalize_county_name(name) == key)
                .unwrap_or(false)
        })
    }

    async fn load_county_list(
        &self,
        metric: &str,
        n: usize,
        desc: bool,
    ) -> Result<Vec<Row>, SourceError> {
        if !self.metric_names.contains(metric) {
            return Err(SourceError::UnknownMetric(metric.to_string()));
        }
        let metric: CensusMetric = metric
            .parse()
            .map_err(SourceError::UnknownMetric)?;
        let value_col = col::POP + metric.offset();

        // One entry per county; its first locale row carries the metrics.
        let mut seen = HashSet::new();
        let mut ranked = Vec::new();
        for row in &self.counties {
            let county_id = read_int(row, col::COUNTY_ID).map_err(decode_error)?;
            if !seen.insert(county_id) {
                continue;
            }
            let value = read_int(row, value_col).map_err(decode_error)?;
            let county_name = read_text(row, col::COUNTY_NAME).map_err(decode_error)?;
            let state_id = read_int(row, col::STATE_ID).map_err(decode_error)?;
            ranked.push(vec![
                Value::Int(county_id),
                Value::from(county_name),
                Value::Int(state_id),
                Value::Int(value),
            ]);
        }

        ranked.sort_by_key(|row| match row[3] {
            Value::Int(v) => v,
            _ => 0,
        });
        if desc {
            ranked.reverse();
        }
        ranked.truncate(n);
        non_empty(Dataset::CountyList, ranked)
    }

    async fn load_metric_names(&self) -> Result<BTreeSet<String>, SourceError> {
        if self.metric_names.is_empty() {
            return Err(SourceError::NoRows {
                dataset: Dataset::MetricNames,
            });
        }
        Ok(self.metric_names.clone())
    }
}
