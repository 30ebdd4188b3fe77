//! # County Cache
//!
//! County reference data is loaded on first request and memoized.
//!
//! ## Concurrency
//!
//! Each key maps to an `Arc<OnceCell<..>>`. Concurrent first requests for the
//! same key await the same cell, so the data source is queried at most once
//! per key while the load succeeds. A failed load leaves the cell empty and
//! the next request retries. The map guard is released before awaiting.
//!
//! County names repeat across states, so the two keys are not symmetric. A
//! record loaded by name (which the caller has checked to be unique, see
//! [`county_ids`]) is also published under its id. A record loaded by id is
//! not published under its name. Rows for one record must share a single
//! county id.
//!
//! Slots for keys whose load failed are dropped again, so unknown keys do not
//! accumulate.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use reregion_core::names::normalize_county_name;
use reregion_core::row::{read_float_or_zero, read_int, read_text, read_text_or_empty};
use reregion_core::{Dataset, RegionError, Row, RowError};
use reregion_tax::{LocaleSchedule, TaxLocaleInfo};

use crate::census::CensusMetrics;
use crate::reference::{malformed, ReferenceCache};
use crate::source::columns::county as col;

/// Static data for one county with all of its tax locales.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyRecord {
    pub county_id: i64,
    pub county_name: String,
    pub state_id: i64,
    /// Resolved from the reference cache at load time.
    pub state_name: String,
    pub metrics: CensusMetrics,
    pub locales: Vec<TaxLocaleInfo>,
}

impl CountyRecord {
    /// Assemble a record from one row per locale. Every row must carry the
    /// same county id and the parent state must be present in `refs`.
    pub fn from_rows(rows: &[Row], refs: &ReferenceCache) -> Result<Self, RegionError> {
        let Some(first) = rows.first() else {
            return Err(RegionError::Inconsistent(
                "county rows are empty".to_string(),
            ));
        };
        let (county_id, county_name, state_id, metrics) = (|| -> Result<_, RowError> {
            Ok((
                read_int(first, col::COUNTY_ID)?,
                read_text(first, col::COUNTY_NAME)?.to_string(),
                read_int(first, col::STATE_ID)?,
                CensusMetrics::read(first, col::POP)?,
            ))
        })()
        .map_err(malformed(Dataset::County, 0))?;

        let ids = county_ids(rows)?;
        if ids.len() > 1 {
            return Err(RegionError::Inconsistent(format!(
                "county rows span several counties: {ids:?}"
            )));
        }

        let state_name = refs.state_name(state_id)?.to_string();

        let locales = rows
            .iter()
            .enumerate()
            .map(|(i, row)| read_locale(row).map_err(malformed(Dataset::County, i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            county_id,
            county_name,
            state_id,
            state_name,
            metrics,
            locales,
        })
    }

}

/// Distinct county ids in `rows`, ascending.
pub fn county_ids(rows: &[Row]) -> Result<Vec<i64>, RegionError> {
    let mut ids = rows
        .iter()
        .enumerate()
        .map(|(i, row)| read_int(row, col::COUNTY_ID).map_err(malformed(Dataset::County, i)))
        .collect::<Result<Vec<_>, _>>()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

fn read_locale(row: &Row) -> Result<TaxLocaleInfo, RowError> {
    Ok(TaxLocaleInfo {
        locale_id: read_int(row, col::LOCALE_ID)?,
        locale_name: read_text(row, col::LOCALE_NAME)?.to_string(),
        resident: LocaleSchedule {
            desc: read_text_or_empty(row, col::RESIDENT_DESC)?.to_string(),
            rate: read_float_or_zero(row, col::RESIDENT_RATE)?,
            month_fee: read_float_or_zero(row, col::RESIDENT_MONTH_FEE)?,
            year_fee: read_float_or_zero(row, col::RESIDENT_YEAR_FEE)?,
            pay_period_fee: read_float_or_zero(row, col::RESIDENT_PAY_PERIOD_FEE)?,
            state_rate: read_float_or_zero(row, col::RESIDENT_STATE_RATE)?,
        },
        nonresident: LocaleSchedule {
            desc: read_text_or_empty(row, col::NONRESIDENT_DESC)?.to_string(),
            rate: read_float_or_zero(row, col::NONRESIDENT_RATE)?,
            month_fee: read_float_or_zero(row, col::NONRESIDENT_MONTH_FEE)?,
            year_fee: read_float_or_zero(row, col::NONRESIDENT_YEAR_FEE)?,
            pay_period_fee: read_float_or_zero(row, col::NONRESIDENT_PAY_PERIOD_FEE)?,
            state_rate: read_float_or_zero(row, col::NONRESIDENT_STATE_RATE)?,
        },
    })
}

type Slot = Arc<OnceCell<Arc<CountyRecord>>>;

/// Lazily populated county records keyed by id and by normalized name.
#[derive(Debug, Default)]
pub struct CountyCache {
    by_id: DashMap<i64, Slot>,
    by_name: DashMap<String, Slot>,
}

impl CountyCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_slot(&self, county_id: i64) -> Slot {
        self.by_id.entry(county_id).or_default().clone()
    }

    fn name_slot(&self, key: &str) -> Slot {
        if let Some(slot) = self.by_name.get(key) {
            return slot.clone();
        }
        self.by_name.entry(key.to_string()).or_default().clone()
    }

    /// Return the cached record for `county_id`, running `load` if absent.
    pub async fn get_or_load_by_id<F, Fut>(
        &self,
        county_id: i64,
        load: F,
    ) -> Result<Arc<CountyRecord>, RegionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CountyRecord, RegionError>>,
    {
        let slot = self.id_slot(county_id);
        Self::resolve(&slot, load).await.map_err(|e| {
            self.by_id.remove_if(&county_id, |_, s| !s.initialized());
            e
        })
    }

    /// Return the cached record for a county name, running `load` if absent.
    /// The name is normalized before lookup.
    pub async fn get_or_load_by_name<F, Fut>(
        &self,
        county_name: &str,
        load: F,
    ) -> Result<Arc<CountyRecord>, RegionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CountyRecord, RegionError>>,
    {
        let key = normalize_county_name(county_name);
        let slot = self.name_slot(&key);
        let record = match Self::resolve(&slot, load).await {
            Ok(record) => record,
            Err(e) => {
                self.by_name.remove_if(&key, |_, s| !s.initialized());
                return Err(e);
            }
        };
        self.publish_id(&record);
        Ok(record)
    }

    async fn resolve<F, Fut>(slot: &Slot, load: F) -> Result<Arc<CountyRecord>, RegionError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<CountyRecord, RegionError>>,
    {
        if let Some(record) = slot.get() {
            tracing::debug!(county_id = record.county_id, "county served from cache");
            return Ok(Arc::clone(record));
        }
        let record = slot
            .get_or_try_init(|| async move { load().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(record))
    }

    fn publish_id(&self, record: &Arc<CountyRecord>) {
        // Already set means a load by id finished first; both hold equal data.
        let _ = self.id_slot(record.county_id).set(Arc::clone(record));
    }

    /// Number of materialized counties.
    pub fn len(&self) -> usize {
        self.by_id.iter().filter(|e| e.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use reregion_core::{ErrorKind, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn refs() -> ReferenceCache {
        let mut b = ReferenceCache::builder();
        b.add_census_rows(&testing::census_rows())
            .unwrap()
            .add_state_tax_rows(&testing::state_tax_rows())
            .unwrap();
        b.build().unwrap()
    }

    #[test]
    fn record_reads_identity_census_and_locales() {
        let record = CountyRecord::from_rows(&testing::county_rows(), &refs()).unwrap();
        assert_eq!(record.county_id, 36061);
        assert_eq!(record.state_name, "New York");
        assert_eq!(record.metrics.pop, 1628706);
        assert_eq!(record.metrics.commute, 81);
        assert_eq!(record.locales.len(), 1);
        assert_eq!(record.locales[0].locale_name, "New York City");
        assert_eq!(record.locales[0].resident.desc, "3.078% - 3.876%");
    }

    #[test]
    fn multiple_rows_become_multiple_locales() {
        let rows = vec![
            testing::county_row(36061, "New York County", 36, 3376, "New York City", 0.03),
            testing::county_row(36061, "New York County", 36, 3377, "Yonkers", 0.01),
        ];
        let record = CountyRecord::from_rows(&rows, &refs()).unwrap();
        assert_eq!(record.locales.len(), 2);
        assert_eq!(record.locales[1].resident.rate, 0.01);
    }

    #[test]
    fn rows_of_different_counties_are_rejected() {
        let rows = vec![
            testing::county_row(36115, "Washington County", 36, 1, "Town A", 0.0),
            testing::county_row(42125, "Washington County", 42, 2, "Town B", 0.0),
        ];
        let err = CountyRecord::from_rows(&rows, &refs()).unwrap_err();
        assert!(matches!(err, RegionError::Inconsistent(_)));
        assert_eq!(county_ids(&rows).unwrap(), vec![36115, 42125]);
    }

    #[test]
    fn null_fees_read_as_zero() {
        let mut rows = testing::county_rows();
        rows[0][col::RESIDENT_MONTH_FEE] = Value::Null;
        let record = CountyRecord::from_rows(&rows, &refs()).unwrap();
        assert_eq!(record.locales[0].resident.month_fee, 0.0);
    }

    #[test]
    fn unknown_parent_state_is_inconsistent() {
        let rows = vec![testing::county_row(6037, "Los Angeles County", 6, 1, "LA", 0.0)];
        let err = CountyRecord::from_rows(&rows, &refs()).unwrap_err();
        assert!(matches!(err, RegionError::Inconsistent(_)));
    }

    #[tokio::test]
    async fn name_load_is_published_under_id() {
        let cache = CountyCache::new();
        let refs = refs();
        let calls = AtomicUsize::new(0);
        let (calls_ref, refs_ref) = (&calls, &refs);
        let load = move || async move {
            calls_ref.fetch_add(1, Ordering::SeqCst);
            CountyRecord::from_rows(&testing::county_rows(), refs_ref)
        };

        let a = cache.get_or_load_by_name("New York", load).await.unwrap();
        let b = cache.get_or_load_by_id(36061, load).await.unwrap();
        let c = cache.get_or_load_by_name("new york county", load).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn id_load_is_not_published_under_name() {
        let cache = CountyCache::new();
        let refs = &refs();
        let record = cache
            .get_or_load_by_id(36061, || async move {
                CountyRecord::from_rows(&testing::county_rows(), refs)
            })
            .await
            .unwrap();
        assert_eq!(record.county_id, 36061);
        assert!(cache.by_name.is_empty());
    }

    #[tokio::test]
    async fn failed_load_is_not_memoized() {
        let cache = CountyCache::new();
        let refs = &refs();
        let err = cache
            .get_or_load_by_id(36061, || async {
                Err(RegionError::not_found(reregion_core::EntityKind::County, 36061))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(cache.is_empty());

        let record = cache
            .get_or_load_by_id(36061, || async move {
                CountyRecord::from_rows(&testing::county_rows(), &refs)
            })
            .await
            .unwrap();
        assert_eq!(record.county_id, 36061);
    }

    #[tokio::test]
    async fn misses_leave_no_slots_behind() {
        let cache = CountyCache::new();
        for id in 0..100 {
            cache
                .get_or_load_by_id(id, || async move {
                    Err(RegionError::not_found(reregion_core::EntityKind::County, id))
                })
                .await
                .unwrap_err();
            let name = format!("nowhere {id}");
            cache
                .get_or_load_by_name(&name, || async {
                    Err(RegionError::not_found(reregion_core::EntityKind::County, "nowhere"))
                })
                .await
                .unwrap_err();
        }
        assert!(cache.is_empty());
        assert_eq!(cache.by_id.len(), 0);
        assert_eq!(cache.by_name.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_requests_load_once() {
        let cache = Arc::new(CountyCache::new());
        let refs = Arc::new(refs());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = Arc::clone(&cache);
            let refs = Arc::clone(&refs);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_load_by_id(36061, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::task::yield_now().await;
                        CountyRecord::from_rows(&testing::county_rows(), &refs)
                    })
                    .await
            }));
        }

        let mut records = Vec::new();
        for handle in handles {
            records.push(handle.await.unwrap().unwrap());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(records.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
