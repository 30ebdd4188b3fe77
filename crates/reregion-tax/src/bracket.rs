//! # Bracket List
//!
//! An ordered sequence of `(threshold, rate)` pairs for one filing variant of
//! one regime.
//!
//! ## Lookup model
//!
//! A single flat rate applies to the whole taxable income: the rate of the
//! last bracket whose threshold is at or below the income. Income below every
//! threshold takes the first bracket's rate; income past the last threshold
//! takes the last bracket's rate. The liability is `income * rate` truncated
//! toward zero. This is not a cumulative marginal calculation.
//!
//! ## Ordering
//!
//! Entries are kept ascending by threshold. Inserting a threshold that is
//! already present replaces the earlier entry at that position.

use serde::Serialize;

/// One `(threshold, rate)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketEntry {
    #[serde(rename = "Bracket")]
    pub threshold: i64,
    #[serde(rename = "Rate")]
    pub rate: f64,
}

impl BracketEntry {
    pub fn new(threshold: i64, rate: f64) -> Self {
        Self { threshold, rate }
    }
}

/// Brackets for a single filing variant, ascending by threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BracketList {
    entries: Vec<BracketEntry>,
}

impl BracketList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping ascending threshold order. A duplicate threshold
    /// overwrites the existing entry (last write wins).
    pub fn insert_ordered(&mut self, entry: BracketEntry) {
        match self
            .entries
            .binary_search_by(|probe| probe.threshold.cmp(&entry.threshold))
        {
            Ok(pos) => self.entries[pos] = entry,
            Err(pos) => self.entries.insert(pos, entry),
        }
    }

    pub fn entries(&self) -> &[BracketEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve the bracket that applies to `income`.
    ///
    /// Returns `None` only for an empty list.
    pub fn bracket_for(&self, income: i64) -> Option<&BracketEntry> {
        // Number of entries with threshold <= income.
        let at_or_below = self.entries.partition_point(|e| e.threshold <= income);
        let index = at_or_below.saturating_sub(1);
        self.entries.get(index)
    }

    pub fn rate_for(&self, income: i64) -> Option<f64> {
        self.bracket_for(income).map(|b| b.rate)
    }

    /// Flat-rate liability for `income`, truncated toward zero.
    ///
    /// An empty list yields zero. Lists held by the reference cache are
    /// validated non-empty at load time.
    pub fn liability_for(&self, income: i64) -> i64 {
        match self.rate_for(income) {
            Some(rate) => truncate(income as f64 * rate),
            None => 0,
        }
    }
}

impl FromIterator<BracketEntry> for BracketList {
    fn from_iter<I: IntoIterator<Item = BracketEntry>>(iter: I) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.insert_ordered(entry);
        }
        list
    }
}

/// Truncate toward zero. Saturates at the `i64` bounds.
pub(crate) fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bracket() -> BracketList {
        [BracketEntry::new(0, 0.02), BracketEntry::new(500, 0.12)]
            .into_iter()
            .collect()
    }

    fn federal_single() -> BracketList {
        [
            BracketEntry::new(0, 0.10),
            BracketEntry::new(10275, 0.12),
            BracketEntry::new(41775, 0.22),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn insert_out_of_order_sorts_by_threshold() {
        let mut list = BracketList::new();
        list.insert_ordered(BracketEntry::new(41775, 0.22));
        list.insert_ordered(BracketEntry::new(0, 0.10));
        list.insert_ordered(BracketEntry::new(10275, 0.12));
        let thresholds: Vec<i64> = list.entries().iter().map(|e| e.threshold).collect();
        assert_eq!(thresholds, vec![0, 10275, 41775]);
    }

    #[test]
    fn duplicate_threshold_last_write_wins() {
        let mut list = two_bracket();
        list.insert_ordered(BracketEntry::new(500, 0.15));
        assert_eq!(list.len(), 2);
        assert_eq!(list.rate_for(600), Some(0.15));
    }

    #[test]
    fn state_example_uses_top_bracket() {
        // 45000 - 2500 - 4 * 1500 = 36500 taxable.
        assert_eq!(two_bracket().liability_for(36500), 4380);
    }

    #[test]
    fn federal_example_uses_middle_bracket() {
        let list = federal_single();
        assert_eq!(list.rate_for(36500), Some(0.12));
        assert_eq!(list.liability_for(36500), 4380);
    }

    #[test]
    fn threshold_boundary_belongs_to_upper_bracket() {
        let list = federal_single();
        assert_eq!(list.rate_for(10274), Some(0.10));
        assert_eq!(list.rate_for(10275), Some(0.12));
        assert_eq!(list.rate_for(41775), Some(0.22));
    }

    #[test]
    fn income_beyond_last_threshold_falls_back_to_top_bracket() {
        assert_eq!(federal_single().rate_for(10_000_000), Some(0.22));
    }

    #[test]
    fn income_below_every_threshold_uses_first_bracket() {
        let list: BracketList = [BracketEntry::new(100, 0.05), BracketEntry::new(200, 0.07)]
            .into_iter()
            .collect();
        assert_eq!(list.rate_for(0), Some(0.05));
    }

    #[test]
    fn liability_truncates_instead_of_rounding() {
        let list: BracketList = [BracketEntry::new(0, 0.0999)].into_iter().collect();
        // 999 * 0.0999 = 99.8001
        assert_eq!(list.liability_for(999), 99);
    }

    #[test]
    fn empty_list_yields_no_rate_and_zero_liability() {
        let list = BracketList::new();
        assert_eq!(list.rate_for(1000), None);
        assert_eq!(list.liability_for(1000), 0);
    }

    #[test]
    fn serializes_as_bracket_rate_pairs() {
        let json = serde_json::to_value(two_bracket()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"Bracket": 0, "Rate": 0.02},
                {"Bracket": 500, "Rate": 0.12}
            ])
        );
    }
}
