//! # Ranked List Cache
//!
//! Per-metric orderings of states, built once from the census rows.
//!
//! Each [`RankedList`] keeps an ascending and a descending sequence. Entries
//! are placed by insertion: in the ascending sequence an entry goes after any
//! entries with an equal value, so ties keep row order; in the descending
//! sequence it goes before them. The descending sequence is therefore the
//! exact reverse of the ascending one.
//!
//! A query takes the first `n` entries of either sequence. `n` larger than the
//! list is clamped.

use std::collections::BTreeMap;

use reregion_core::{EntityKind, RegionError};

use crate::census::CensusMetric;
use crate::reference::StateCensus;

/// One ranked `(id, name, value)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub id: i64,
    pub name: String,
    pub value: i64,
}

/// Ascending and descending orderings for one metric.
#[derive(Debug, Clone, Default)]
pub struct RankedList {
    metric: String,
    ascending: Vec<RankedEntry>,
    descending: Vec<RankedEntry>,
}

impl RankedList {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            ascending: Vec::new(),
            descending: Vec::new(),
        }
    }

    /// Insert into both sequences at the sorted position.
    pub fn insert(&mut self, entry: RankedEntry) {
        let asc = self.ascending.partition_point(|e| e.value <= entry.value);
        let desc = self.descending.partition_point(|e| e.value > entry.value);
        self.ascending.insert(asc, entry.clone());
        self.descending.insert(desc, entry);
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn ascending(&self) -> &[RankedEntry] {
        &self.ascending
    }

    pub fn descending(&self) -> &[RankedEntry] {
        &self.descending
    }

    pub fn len(&self) -> usize {
        self.ascending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ascending.is_empty()
    }

    /// First `n` entries in the requested direction, clamped to the list length.
    pub fn top(&self, n: usize, desc: bool) -> &[RankedEntry] {
        let seq = if desc {
            &self.descending
        } else {
            &self.ascending
        };
        &seq[..n.min(seq.len())]
    }
}

/// Ranked lists of states keyed by metric name.
#[derive(Debug, Clone, Default)]
pub struct RankedListCache {
    lists: BTreeMap<String, RankedList>,
}

impl RankedListCache {
    /// Build one list per [`CensusMetric`] from census records in row order.
    pub fn build<'a>(states: impl IntoIterator<Item = &'a StateCensus> + Clone) -> Self {
        let mut lists = BTreeMap::new();
        for metric in CensusMetric::ALL {
            let mut list = RankedList::new(metric.as_str());
            for state in states.clone() {
                list.insert(RankedEntry {
                    id: state.state_id,
                    name: state.state_name.clone(),
                    value: state.metrics.get(metric),
                });
            }
            lists.insert(metric.as_str().to_string(), list);
        }
        Self { lists }
    }

    pub fn get(&self, metric: &str) -> Result<&RankedList, RegionError> {
        self.lists
            .get(metric)
            .ok_or_else(|| RegionError::not_found(EntityKind::Metric, metric))
    }

    /// First `n` states for `metric`. Unknown metrics are not found.
    pub fn query(&self, metric: &str, n: usize, desc: bool) -> Result<&[RankedEntry], RegionError> {
        Ok(self.get(metric)?.top(n, desc))
    }

    pub fn metrics(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceCache;
    use crate::testing;
    use reregion_core::ErrorKind;

    fn cache() -> RankedListCache {
        let mut b = ReferenceCache::builder();
        b.add_census_rows(&testing::census_rows()).unwrap();
        let refs = b.build().unwrap();
        RankedListCache::build(refs.states())
    }

    fn ids(entries: &[RankedEntry]) -> Vec<i64> {
        entries.iter().map(|e| e.id).collect()
    }

    #[test]
    fn one_list_per_metric() {
        let c = cache();
        assert_eq!(c.len(), CensusMetric::ALL.len());
        assert!(c.metrics().any(|m| m == "median_income"));
    }

    #[test]
    fn descending_top_one_is_highest() {
        let top = cache().query("pop", 1, true).unwrap().to_vec();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "New York");
        assert_eq!(top[0].value, 18466230);
    }

    #[test]
    fn ascending_orders_by_value() {
        let c = cache();
        assert_eq!(ids(c.query("pop", 4, false).unwrap()), vec![54, 29, 42, 36]);
    }

    #[test]
    fn ties_keep_row_order_ascending_and_reverse_descending() {
        // Pennsylvania (row 1) and Missouri (row 3) both commute 11.
        let c = cache();
        assert_eq!(ids(c.query("commute", 4, false).unwrap()), vec![54, 42, 29, 36]);
        assert_eq!(ids(c.query("commute", 4, true).unwrap()), vec![36, 29, 42, 54]);
    }

    #[test]
    fn full_descending_is_reverse_of_full_ascending() {
        let c = cache();
        for metric in CensusMetric::ALL {
            let list = c.get(metric.as_str()).unwrap();
            let mut asc = list.ascending().to_vec();
            asc.reverse();
            assert_eq!(asc, list.descending());
        }
    }

    #[test]
    fn oversized_n_is_clamped() {
        let c = cache();
        assert_eq!(c.query("commute", 500, true).unwrap().len(), 4);
        assert!(c.query("commute", 0, true).unwrap().is_empty());
    }

    #[test]
    fn unknown_metric_is_not_found() {
        let err = cache().query("bogus_metric", 3, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "metric bogus_metric not found");
    }
}
