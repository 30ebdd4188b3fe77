//! # Region Service
//!
//! Assembles public entities from the caches and the tax engine.
//!
//! ## Lifecycle
//!
//! [`RegionService::load`] reads the federal regime, state census, state
//! regimes and the county metric names from the data source, then freezes
//! them. Any failure during load is fatal. Counties are fetched on first
//! request and memoized in a [`CountyCache`]. County lists are not cached.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use reregion_core::names::normalize_county_name;
use reregion_core::row::{read_int, read_text};
use reregion_core::{Dataset, EntityKind, RegionError, SourceError};
use reregion_tax::{compute_liability, compute_local_liability, Filing, FederalTaxInfo, StateTaxInfo};

use crate::county::{county_ids, CountyCache, CountyRecord};
use crate::entities::{
    County, CountyList, CountyMetricPair, CountyTaxList, State, StateList, StateMetricPair,
    TaxLocale,
};
use crate::ranked::RankedListCache;
use crate::reference::{malformed, ReferenceCache, StateCensus};
use crate::source::columns::county_list as col;
use crate::source::DataSource;

/// Counts reported by the health and metrics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub states: usize,
    pub state_tax_regimes: usize,
    pub ranked_metrics: usize,
    pub county_metrics: usize,
    pub counties_cached: usize,
    pub loaded_at: DateTime<Utc>,
}

pub struct RegionService {
    source: Arc<dyn DataSource>,
    reference: ReferenceCache,
    ranked: RankedListCache,
    counties: CountyCache,
    metric_names: BTreeSet<String>,
}

impl std::fmt::Debug for RegionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionService")
            .field("states", &self.reference.state_count())
            .field("counties_cached", &self.counties.len())
            .finish_non_exhaustive()
    }
}

impl RegionService {
    /// Populate the reference and ranked list caches from `source`.
    pub async fn load(source: Arc<dyn DataSource>) -> Result<Self, RegionError> {
        let mut builder = ReferenceCache::builder();

        let federal = source.load_federal_tax().await?;
        builder.set_federal_rows(&federal)?;
        tracing::info!(brackets = federal.len(), "federal tax regime loaded");

        let census = source.load_state_census().await?;
        builder.add_census_rows(&census)?;
        tracing::info!(states = census.len(), "state census loaded");

        let state_tax = source.load_state_tax().await?;
        builder.add_state_tax_rows(&state_tax)?;
        tracing::info!(rows = state_tax.len(), "state tax regimes loaded");

        let metric_names = source.load_metric_names().await?;
        tracing::info!(metrics = metric_names.len(), "county metric names loaded");

        let reference = builder.build()?;
        let ranked = RankedListCache::build(reference.states());

        Ok(Self {
            source,
            reference,
            ranked,
            counties: CountyCache::new(),
            metric_names,
        })
    }

    pub fn reference(&self) -> &ReferenceCache {
        &self.reference
    }

    // -- States --------------------------------------------------------------

    pub fn state_by_id(&self, state_id: i64, filing: &Filing) -> Result<State, RegionError> {
        let census = self.reference.state_census_by_id(state_id)?;
        self.assemble_state(census, filing)
    }

    pub fn state_by_name(&self, name: &str, filing: &Filing) -> Result<State, RegionError> {
        let census = self.reference.state_census_by_name(name)?;
        self.assemble_state(census, filing)
    }

    fn assemble_state(&self, census: &StateCensus, filing: &Filing) -> Result<State, RegionError> {
        let regime = self.reference.state_tax_by_id(census.state_id)?;
        let federal = self.reference.federal()?;
        let liability = compute_liability(
            filing.status,
            filing.dependents,
            filing.income,
            regime,
            federal,
        );
        tracing::debug!(
            state_id = census.state_id,
            status = %filing.status,
            income = filing.income,
            total = liability.total,
            "state liability computed"
        );
        Ok(State {
            state_id: census.state_id,
            state_name: census.state_name.clone(),
            metrics: census.metrics.into(),
            total_tax: liability.total,
            state_tax: liability.state_tax,
            federal_tax: liability.federal_tax,
        })
    }

    pub fn state_tax_by_id(&self, state_id: i64) -> Result<&StateTaxInfo, RegionError> {
        self.reference.state_tax_by_id(state_id)
    }

    pub fn state_tax_by_name(&self, name: &str) -> Result<&StateTaxInfo, RegionError> {
        self.reference.state_tax_by_name(name)
    }

    pub fn federal_tax(&self) -> Result<&FederalTaxInfo, RegionError> {
        self.reference.federal()
    }

    pub fn state_list(&self, metric: &str, n: usize, desc: bool) -> Result<StateList, RegionError> {
        let ranked_list = self
            .ranked
            .query(metric, n, desc)?
            .iter()
            .map(|e| StateMetricPair {
                state_id: e.id,
                state_name: e.name.clone(),
                metric_value: e.value,
            })
            .collect();
        Ok(StateList {
            metric_name: metric.to_string(),
            ranked_list,
        })
    }

    // -- Counties ------------------------------------------------------------

    async fn county_record_by_id(&self, county_id: i64) -> Result<Arc<CountyRecord>, RegionError> {
        self.counties
            .get_or_load_by_id(county_id, move || async move {
                tracing::info!(county_id, "loading county");
                let rows = self
                    .source
                    .load_county_by_id(county_id)
                    .await
                    .map_err(|e| county_error(e, county_id))?;
                CountyRecord::from_rows(&rows, &self.reference)
            })
            .await
    }

    async fn county_record_by_name(&self, name: &str) -> Result<Arc<CountyRecord>, RegionError> {
        let key = normalize_county_name(name);
        let key = key.as_str();
        self.counties
            .get_or_load_by_name(key, move || async move {
                tracing::info!(county_name = key, "loading county");
                let rows = self
                    .source
                    .load_county_by_name(key)
                    .await
                    .map_err(|e| county_error(e, name.trim()))?;
                let ids = county_ids(&rows)?;
                if ids.len() > 1 {
                    tracing::warn!(county_name = key, matches = ids.len(), "ambiguous county name");
                    return Err(RegionError::Ambiguous {
                        entity: EntityKind::County,
                        key: name.trim().to_string(),
                        ids,
                    });
                }
                CountyRecord::from_rows(&rows, &self.reference)
            })
            .await
    }

    pub async fn county_by_id(&self, county_id: i64, filing: &Filing) -> Result<County, RegionError> {
        let record = self.county_record_by_id(county_id).await?;
        self.assemble_county(&record, filing)
    }

    pub async fn county_by_name(&self, name: &str, filing: &Filing) -> Result<County, RegionError> {
        let record = self.county_record_by_name(name).await?;
        self.assemble_county(&record, filing)
    }

    fn assemble_county(&self, record: &CountyRecord, filing: &Filing) -> Result<County, RegionError> {
        let regime = self.parent_regime(record)?;
        let federal = self.reference.federal()?;
        let tax_locale = record
            .locales
            .iter()
            .map(|locale| {
                let l = compute_local_liability(filing, regime, federal, locale);
                TaxLocale {
                    locale_id: locale.locale_id,
                    locale_name: locale.locale_name.clone(),
                    total_tax: l.total,
                    federal_tax: l.federal_tax,
                    state_tax: l.state_tax,
                    locale_tax: l.locale_tax,
                }
            })
            .collect();
        Ok(County {
            county_id: record.county_id,
            county_name: record.county_name.clone(),
            state_id: record.state_id,
            state_name: record.state_name.clone(),
            metrics: record.metrics.into(),
            tax_locale,
        })
    }

    fn parent_regime(&self, record: &CountyRecord) -> Result<&StateTaxInfo, RegionError> {
        self.reference.state_tax_by_id(record.state_id).map_err(|_| {
            RegionError::Inconsistent(format!(
                "county {} references state {} which has no tax regime",
                record.county_id, record.state_id
            ))
        })
    }

    pub async fn county_tax_by_id(&self, county_id: i64) -> Result<CountyTaxList, RegionError> {
        let record = self.county_record_by_id(county_id).await?;
        Ok(county_tax_list(&record))
    }

    pub async fn county_tax_by_name(&self, name: &str) -> Result<CountyTaxList, RegionError> {
        let record = self.county_record_by_name(name).await?;
        Ok(county_tax_list(&record))
    }

    /// First `n` counties ordered by `metric`, fetched from the data source on
    /// every call.
    pub async fn county_list(
        &self,
        metric: &str,
        n: usize,
        desc: bool,
    ) -> Result<CountyList, RegionError> {
        if !self.metric_names.contains(metric) {
            return Err(RegionError::not_found(EntityKind::Metric, metric));
        }
        if n == 0 {
            return Ok(CountyList {
                metric_name: metric.to_string(),
                ranked_list: Vec::new(),
            });
        }

        let rows = match self.source.load_county_list(metric, n, desc).await {
            Ok(rows) => rows,
            Err(SourceError::UnknownMetric(_)) | Err(SourceError::NoRows { .. }) => {
                return Err(RegionError::not_found(EntityKind::Metric, metric));
            }
            Err(e) => return Err(e.into()),
        };

        let ranked_list = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let county_id = read_int(row, col::COUNTY_ID).map_err(malformed(Dataset::CountyList, i))?;
                let county_name = read_text(row, col::COUNTY_NAME)
                    .map_err(malformed(Dataset::CountyList, i))?
                    .to_string();
                let state_id = read_int(row, col::STATE_ID).map_err(malformed(Dataset::CountyList, i))?;
                let metric_value =
                    read_int(row, col::METRIC_VALUE).map_err(malformed(Dataset::CountyList, i))?;
                Ok(CountyMetricPair {
                    county_id,
                    county_name,
                    state_id,
                    state_name: self.reference.state_name(state_id)?.to_string(),
                    metric_value,
                })
            })
            .collect::<Result<Vec<_>, RegionError>>()?;

        Ok(CountyList {
            metric_name: metric.to_string(),
            ranked_list,
        })
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            states: self.reference.state_count(),
            state_tax_regimes: self.reference.state_tax_count(),
            ranked_metrics: self.ranked.len(),
            county_metrics: self.metric_names.len(),
            counties_cached: self.counties.len(),
            loaded_at: self.reference.loaded_at(),
        }
    }
}

fn county_error(e: SourceError, key: impl std::fmt::Display) -> RegionError {
    match e {
        SourceError::NoRows { .. } => RegionError::not_found(EntityKind::County, key),
        other => RegionError::Source(other),
    }
}

fn county_tax_list(record: &CountyRecord) -> CountyTaxList {
    CountyTaxList {
        county_name: record.county_name.clone(),
        county_id: record.county_id,
        state_name: record.state_name.clone(),
        state_id: record.state_id,
        tax_locales: record.locales.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use crate::testing;
    use async_trait::async_trait;
    use reregion_core::{ErrorKind, FilingStatus, Row};
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn service() -> RegionService {
        RegionService::load(Arc::new(testing::memory_source()))
            .await
            .unwrap()
    }

    fn single(dependents: u32, income: i64) -> Filing {
        Filing::new(FilingStatus::Single, dependents, income, false)
    }

    /// Counts county loads and delegates to a memory source.
    struct CountingSource {
        inner: MemorySource,
        county_loads: AtomicUsize,
    }

    #[async_trait]
    impl DataSource for CountingSource {
        async fn load_state_census(&self) -> Result<Vec<Row>, SourceError> {
            self.inner.load_state_census().await
        }
        async fn load_state_tax(&self) -> Result<Vec<Row>, SourceError> {
            self.inner.load_state_tax().await
        }
        async fn load_federal_tax(&self) -> Result<Vec<Row>, SourceError> {
            self.inner.load_federal_tax().await
        }
        async fn load_county_by_id(&self, county_id: i64) -> Result<Vec<Row>, SourceError> {
            self.county_loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_county_by_id(county_id).await
        }
        async fn load_county_by_name(&self, county_name: &str) -> Result<Vec<Row>, SourceError> {
            self.county_loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_county_by_name(county_name).await
        }
        async fn load_county_list(
            &self,
            metric: &str,
            n: usize,
            desc: bool,
        ) -> Result<Vec<Row>, SourceError> {
            self.inner.load_county_list(metric, n, desc).await
        }
        async fn load_metric_names(&self) -> Result<BTreeSet<String>, SourceError> {
            self.inner.load_metric_names().await
        }
    }

    /// Serves reference data but fails every county query.
    struct UnreachableCounties {
        inner: MemorySource,
    }

    #[async_trait]
    impl DataSource for UnreachableCounties {
        async fn load_state_census(&self) -> Result<Vec<Row>, SourceError> {
            self.inner.load_state_census().await
        }
        async fn load_state_tax(&self) -> Result<Vec<Row>, SourceError> {
            self.inner.load_state_tax().await
        }
        async fn load_federal_tax(&self) -> Result<Vec<Row>, SourceError> {
            self.inner.load_federal_tax().await
        }
        async fn load_county_by_id(&self, _county_id: i64) -> Result<Vec<Row>, SourceError> {
            Err(SourceError::Connection("connection refused".into()))
        }
        async fn load_county_by_name(&self, _county_name: &str) -> Result<Vec<Row>, SourceError> {
            Err(SourceError::Connection("connection refused".into()))
        }
        async fn load_county_list(
            &self,
            _metric: &str,
            _n: usize,
            _desc: bool,
        ) -> Result<Vec<Row>, SourceError> {
            Err(SourceError::Connection("connection refused".into()))
        }
        async fn load_metric_names(&self) -> Result<BTreeSet<String>, SourceError> {
            self.inner.load_metric_names().await
        }
    }

    fn washington_rows() -> Vec<Row> {
        vec![
            testing::county_row(36115, "Washington County", 36, 1, "Town A", 0.0),
            testing::county_row(42125, "Washington County", 42, 2, "Town B", 0.0),
        ]
    }

    #[tokio::test]
    async fn state_liability_by_id_and_name_agree() {
        let s = service().await;
        let by_id = s.state_by_id(36, &single(4, 45000)).unwrap();
        let by_name = s.state_by_name("  new york ", &single(4, 45000)).unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.state_tax, 4380);
        assert_eq!(by_id.federal_tax, 3846);
        assert_eq!(by_id.total_tax, 8226);
        assert_eq!(by_id.metrics.pop, 18466230);
    }

    #[tokio::test]
    async fn zero_income_has_zero_liability() {
        let s = service().await;
        let state = s.state_by_id(36, &single(0, 0)).unwrap();
        assert_eq!((state.state_tax, state.federal_tax, state.total_tax), (0, 0, 0));
    }

    #[tokio::test]
    async fn unknown_state_is_not_found() {
        let s = service().await;
        let err = s.state_by_id(99, &single(0, 1000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = s.state_tax_by_name("atlantis").unwrap_err();
        assert_eq!(err.to_string(), "state tax info atlantis not found");
    }

    #[tokio::test]
    async fn census_state_without_regime_is_state_tax_not_found() {
        let s = service().await;
        let err = s.state_by_id(42, &single(0, 1000)).unwrap_err();
        assert_eq!(
            err,
            RegionError::not_found(EntityKind::StateTax, 42)
        );
    }

    #[tokio::test]
    async fn federal_and_state_tax_info_are_served_from_cache() {
        let s = service().await;
        assert_eq!(s.federal_tax().unwrap().deduction(FilingStatus::Head), 19400);
        let ny = s.state_tax_by_id(36).unwrap();
        assert_eq!(ny.single_brackets().len(), 2);
        assert!(std::ptr::eq(ny, s.state_tax_by_name("New York").unwrap()));
    }

    #[tokio::test]
    async fn state_list_is_ranked() {
        let s = service().await;
        let list = s.state_list("pop", 1, true).unwrap();
        assert_eq!(list.metric_name, "pop");
        assert_eq!(list.ranked_list.len(), 1);
        assert_eq!(list.ranked_list[0].state_name, "New York");
        assert!(s.state_list("bogus_metric", 3, true).is_err());
    }

    #[tokio::test]
    async fn county_liability_per_locale() {
        let s = service().await;
        let county = s.county_by_id(36061, &single(4, 45000)).await.unwrap();
        assert_eq!(county.state_name, "New York");
        assert_eq!(county.tax_locale.len(), 1);
        let locale = &county.tax_locale[0];
        assert_eq!(locale.state_tax, 4380);
        assert_eq!(locale.federal_tax, 3846);
        assert_eq!(locale.locale_tax, 0);
        assert_eq!(locale.total_tax, 8226);
    }

    #[tokio::test]
    async fn resident_flag_selects_schedule() {
        let source = testing::memory_source().with_counties(vec![testing::county_row(
            36061,
            "New York County",
            36,
            3376,
            "New York City",
            0.03,
        )]);
        let s = RegionService::load(Arc::new(source)).await.unwrap();
        let resident = Filing::new(FilingStatus::Single, 0, 10000, true);
        let nonresident = Filing { resident: false, ..resident };
        let r = s.county_by_id(36061, &resident).await.unwrap();
        let n = s.county_by_id(36061, &nonresident).await.unwrap();
        assert_eq!(r.tax_locale[0].locale_tax, 300);
        assert_eq!(n.tax_locale[0].locale_tax, 0);
    }

    #[tokio::test]
    async fn county_loaded_by_name_is_reused_by_id() {
        let source = Arc::new(CountingSource {
            inner: testing::memory_source(),
            county_loads: AtomicUsize::new(0),
        });
        let s = RegionService::load(source.clone()).await.unwrap();

        s.county_by_name("New York", &single(0, 1000)).await.unwrap();
        s.county_by_id(36061, &single(0, 1000)).await.unwrap();
        s.county_tax_by_name("new york county").await.unwrap();
        s.county_tax_by_id(36061).await.unwrap();

        assert_eq!(source.county_loads.load(Ordering::SeqCst), 1);
        assert_eq!(s.stats().counties_cached, 1);
    }

    #[tokio::test]
    async fn unknown_county_is_not_found_and_retried() {
        let source = Arc::new(CountingSource {
            inner: testing::memory_source(),
            county_loads: AtomicUsize::new(0),
        });
        let s = RegionService::load(source.clone()).await.unwrap();

        let err = s.county_by_id(1, &single(0, 0)).await.unwrap_err();
        assert_eq!(err, RegionError::not_found(EntityKind::County, 1));
        s.county_tax_by_id(1).await.unwrap_err();
        assert_eq!(source.county_loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn county_tax_list_carries_locale_schedules() {
        let s = service().await;
        let list = s.county_tax_by_id(36061).await.unwrap();
        assert_eq!(list.state_id, 36);
        assert_eq!(list.tax_locales[0].resident.desc, "3.078% - 3.876%");
    }

    #[tokio::test]
    async fn county_list_resolves_state_names() {
        let s = service().await;
        let list = s.county_list("pop", 5, true).await.unwrap();
        assert_eq!(list.ranked_list.len(), 1);
        assert_eq!(list.ranked_list[0].state_name, "New York");
        assert_eq!(list.ranked_list[0].metric_value, 1628706);
    }

    #[tokio::test]
    async fn county_list_with_zero_size_is_empty() {
        let s = service().await;
        assert!(s.county_list("pop", 0, false).await.unwrap().ranked_list.is_empty());
    }

    #[tokio::test]
    async fn county_list_unknown_metric_is_not_found() {
        let s = service().await;
        let err = s.county_list("bogus_metric", 3, false).await.unwrap_err();
        assert_eq!(err.to_string(), "metric bogus_metric not found");
    }

    #[tokio::test]
    async fn load_fails_without_federal_rows() {
        let source = testing::memory_source().with_federal_tax(Vec::new());
        let err = RegionService::load(Arc::new(source)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn stats_report_counts() {
        let s = service().await;
        let stats = s.stats();
        assert_eq!(stats.states, 4);
        assert_eq!(stats.state_tax_regimes, 1);
        assert_eq!(stats.ranked_metrics, 6);
        assert_eq!(stats.counties_cached, 0);
    }
    #[tokio::test]
    async fn county_failures_from_the_source_are_internal() {
        let source = UnreachableCounties {
            inner: testing::memory_source(),
        };
        let s = RegionService::load(Arc::new(source)).await.unwrap();

        let err = s.county_list("pop", 3, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(matches!(err, RegionError::Source(SourceError::Connection(_))));

        let err = s.county_by_id(36061, &single(0, 1000)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        let err = s.county_tax_by_name("New York").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(s.stats().counties_cached, 0);

        // Reference data is unaffected.
        assert_eq!(s.state_by_id(36, &single(4, 45000)).unwrap().total_tax, 8226);
    }

    #[tokio::test]
    async fn shared_county_name_is_ambiguous_and_never_merged() {
        let source = testing::memory_source().with_counties(washington_rows());
        let s = RegionService::load(Arc::new(source)).await.unwrap();

        let err = s.county_tax_by_name("Washington").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
        assert_eq!(
            err,
            RegionError::Ambiguous {
                entity: EntityKind::County,
                key: "Washington".into(),
                ids: vec![36115, 42125],
            }
        );

        let a = s.county_tax_by_id(36115).await.unwrap();
        let b = s.county_tax_by_id(42125).await.unwrap();
        assert_eq!(a.tax_locales.len(), 1);
        assert_eq!(a.tax_locales[0].locale_name, "Town A");
        assert_eq!(b.tax_locales.len(), 1);
        assert_eq!(b.tax_locales[0].locale_name, "Town B");
        assert_eq!(b.state_name, "Pennsylvania");

        // Still ambiguous once both counties are cached by id.
        let err = s.county_tax_by_name("washington county").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
        assert_eq!(s.county_tax_by_id(36115).await.unwrap().tax_locales.len(), 1);
    }
}
