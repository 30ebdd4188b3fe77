//! # Reference Cache
//!
//! Write-once maps from state identifiers to census records and tax regimes,
//! plus the federal regime singleton.
//!
//! ## Identity
//!
//! Each record lives once in an [`Indexed`] arena. The by-id and by-name
//! indices both hold the arena slot, so a bracket appended through one key is
//! visible through the other.
//!
//! ## Lifecycle
//!
//! [`ReferenceCacheBuilder`] is the only mutable phase. [`ReferenceCacheBuilder::build`]
//! validates every bracket list and freezes the result into a
//! [`ReferenceCache`], which exposes lookups only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use reregion_core::names::normalize_state_name;
use reregion_core::row::{read_float, read_int, read_text};
use reregion_core::{Dataset, EntityKind, RegionError, Row, RowError};
use reregion_tax::{BracketEntry, FederalDeductions, FederalTaxInfo, StateAllowances, StateTaxInfo};

use crate::census::CensusMetrics;
use crate::source::columns;

/// Wrap a column error with the dataset and row position.
pub(crate) fn malformed(dataset: Dataset, row: usize) -> impl FnOnce(RowError) -> RegionError {
    move |source| RegionError::MalformedRow {
        dataset,
        row,
        source,
    }
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Records addressable by numeric id and by normalized name.
#[derive(Debug, Clone)]
pub struct Indexed<T> {
    items: Vec<T>,
    by_id: HashMap<i64, usize>,
    by_name: HashMap<String, usize>,
}

impl<T> Default for Indexed<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            by_id: HashMap::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<T> Indexed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert under both keys and return the slot. If `id` is already present
    /// the existing slot is returned and `item` is dropped.
    pub fn insert(&mut self, id: i64, name_key: String, item: T) -> usize {
        if let Some(&slot) = self.by_id.get(&id) {
            return slot;
        }
        let slot = self.items.len();
        self.items.push(item);
        self.by_id.insert(id, slot);
        self.by_name.insert(name_key, slot);
        slot
    }

    pub fn slot_by_id(&self, id: i64) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn slot_by_name(&self, name_key: &str) -> Option<usize> {
        self.by_name.get(name_key).copied()
    }

    pub fn get_by_id(&self, id: i64) -> Option<&T> {
        self.slot_by_id(id).and_then(|slot| self.items.get(slot))
    }

    pub fn get_by_name(&self, name_key: &str) -> Option<&T> {
        self.slot_by_name(name_key).and_then(|slot| self.items.get(slot))
    }

    pub fn get_mut_by_id(&mut self, id: i64) -> Option<&mut T> {
        let slot = self.slot_by_id(id)?;
        self.items.get_mut(slot)
    }

    pub fn get_mut_by_name(&mut self, name_key: &str) -> Option<&mut T> {
        let slot = self.slot_by_name(name_key)?;
        self.items.get_mut(slot)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Census record of one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCensus {
    pub state_id: i64,
    pub state_name: String,
    pub metrics: CensusMetrics,
}

impl StateCensus {
    fn from_row(row: &Row) -> Result<Self, RowError> {
        Ok(Self {
            state_id: read_int(row, columns::census::STATE_ID)?,
            state_name: read_text(row, columns::census::STATE_NAME)?.to_string(),
            metrics: CensusMetrics::read(row, columns::census::POP)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Mutable loading phase of the reference cache.
#[derive(Debug, Default)]
pub struct ReferenceCacheBuilder {
    census: Indexed<StateCensus>,
    state_tax: Indexed<StateTaxInfo>,
    federal: Option<FederalTaxInfo>,
}

impl ReferenceCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load census rows. Row order is preserved for ranked lists.
    pub fn add_census_rows(&mut self, rows: &[Row]) -> Result<&mut Self, RegionError> {
        for (i, row) in rows.iter().enumerate() {
            let record = StateCensus::from_row(row).map_err(malformed(Dataset::StateCensus, i))?;
            let key = normalize_state_name(&record.state_name);
            self.census.insert(record.state_id, key, record);
        }
        tracing::debug!(states = self.census.len(), "state census loaded");
        Ok(self)
    }

    /// Load state tax rows, grouping bracket rows into one regime per state.
    pub fn add_state_tax_rows(&mut self, rows: &[Row]) -> Result<&mut Self, RegionError> {
        use columns::state_tax as col;

        for (i, row) in rows.iter().enumerate() {
            let decode = || -> Result<(i64, StateBracketRow), RowError> {
                let state_id = read_int(row, col::STATE_ID)?;
                Ok((
                    state_id,
                    StateBracketRow {
                        single: BracketEntry::new(
                            read_int(row, col::SINGLE_BRACKET)?,
                            read_float(row, col::SINGLE_RATE)?,
                        ),
                        married: BracketEntry::new(
                            read_int(row, col::MARRIED_BRACKET)?,
                            read_float(row, col::MARRIED_RATE)?,
                        ),
                    },
                ))
            };
            let (state_id, bracket) = decode().map_err(malformed(Dataset::StateTax, i))?;

            if self.state_tax.slot_by_id(state_id).is_none() {
                let info = new_state_regime(row).map_err(malformed(Dataset::StateTax, i))?;
                let key = normalize_state_name(&info.state_name);
                self.state_tax.insert(state_id, key, info);
            }
            if let Some(info) = self.state_tax.get_mut_by_id(state_id) {
                info.push_bracket(bracket.single, bracket.married);
            }
        }
        tracing::debug!(regimes = self.state_tax.len(), "state tax loaded");
        Ok(self)
    }

    /// Load the federal regime. Deductions come from the first row.
    pub fn set_federal_rows(&mut self, rows: &[Row]) -> Result<&mut Self, RegionError> {
        use columns::federal_tax as col;

        let Some(first) = rows.first() else {
            return Err(RegionError::EmptyFederalCache);
        };
        let deductions = (|| -> Result<FederalDeductions, RowError> {
            Ok(FederalDeductions {
                single: read_int(first, col::SINGLE_DEDUCTION)?,
                married: read_int(first, col::MARRIED_DEDUCTION)?,
                head: read_int(first, col::HEAD_DEDUCTION)?,
            })
        })()
        .map_err(malformed(Dataset::FederalTax, 0))?;

        let mut info = FederalTaxInfo::new(deductions);
        for (i, row) in rows.iter().enumerate() {
            let decode = || -> Result<(f64, i64, i64, i64), RowError> {
                Ok((
                    read_float(row, col::RATE)?,
                    read_int(row, col::SINGLE_BRACKET)?,
                    read_int(row, col::MARRIED_BRACKET)?,
                    read_int(row, col::HEAD_BRACKET)?,
                ))
            };
            let (rate, single, married, head) =
                decode().map_err(malformed(Dataset::FederalTax, i))?;
            info.push_bracket(rate, single, married, head);
        }
        self.federal = Some(info);
        Ok(self)
    }

    /// Mutable access to a regime through its id, for loading only.
    pub fn state_tax_by_id_mut(&mut self, state_id: i64) -> Option<&mut StateTaxInfo> {
        self.state_tax.get_mut_by_id(state_id)
    }

    /// Mutable access to a regime through its name, for loading only.
    pub fn state_tax_by_name_mut(&mut self, name: &str) -> Option<&mut StateTaxInfo> {
        self.state_tax.get_mut_by_name(&normalize_state_name(name))
    }

    pub fn state_tax_by_name(&self, name: &str) -> Option<&StateTaxInfo> {
        self.state_tax.get_by_name(&normalize_state_name(name))
    }

    /// Validate bracket lists and freeze.
    pub fn build(self) -> Result<ReferenceCache, RegionError> {
        for info in self.state_tax.iter() {
            info.validate()?;
        }
        if let Some(federal) = &self.federal {
            federal.validate()?;
        }
        for census in self.census.iter() {
            if self.state_tax.slot_by_id(census.state_id).is_none() {
                tracing::warn!(
                    state_id = census.state_id,
                    "state has census data but no tax regime"
                );
            }
        }
        Ok(ReferenceCache {
            census: self.census,
            state_tax: self.state_tax,
            federal: self.federal,
            loaded_at: Utc::now(),
        })
    }
}

struct StateBracketRow {
    single: BracketEntry,
    married: BracketEntry,
}

fn new_state_regime(row: &Row) -> Result<StateTaxInfo, RowError> {
    use columns::state_tax as col;
    Ok(StateTaxInfo::new(
        read_int(row, col::STATE_ID)?,
        read_text(row, col::STATE_NAME)?,
        StateAllowances {
            single_deduction: read_int(row, col::SINGLE_DEDUCTION)?,
            married_deduction: read_int(row, col::MARRIED_DEDUCTION)?,
            single_exemption: read_int(row, col::SINGLE_EXEMPTION)?,
            married_exemption: read_int(row, col::MARRIED_EXEMPTION)?,
            dependent_exemption: read_int(row, col::DEPENDENT_EXEMPTION)?,
        },
    ))
}

// ---------------------------------------------------------------------------
// Frozen cache
// ---------------------------------------------------------------------------

/// Read-only reference data.
#[derive(Debug, Clone)]
pub struct ReferenceCache {
    census: Indexed<StateCensus>,
    state_tax: Indexed<StateTaxInfo>,
    federal: Option<FederalTaxInfo>,
    loaded_at: DateTime<Utc>,
}

impl ReferenceCache {
    pub fn builder() -> ReferenceCacheBuilder {
        ReferenceCacheBuilder::new()
    }

    pub fn state_census_by_id(&self, state_id: i64) -> Result<&StateCensus, RegionError> {
        self.census
            .get_by_id(state_id)
            .ok_or_else(|| RegionError::not_found(EntityKind::State, state_id))
    }

    pub fn state_census_by_name(&self, name: &str) -> Result<&StateCensus, RegionError> {
        self.census
            .get_by_name(&normalize_state_name(name))
            .ok_or_else(|| RegionError::not_found(EntityKind::State, name.trim()))
    }

    pub fn state_tax_by_id(&self, state_id: i64) -> Result<&StateTaxInfo, RegionError> {
        self.state_tax
            .get_by_id(state_id)
            .ok_or_else(|| RegionError::not_found(EntityKind::StateTax, state_id))
    }

    pub fn state_tax_by_name(&self, name: &str) -> Result<&StateTaxInfo, RegionError> {
        self.state_tax
            .get_by_name(&normalize_state_name(name))
            .ok_or_else(|| RegionError::not_found(EntityKind::StateTax, name.trim()))
    }

    /// The federal regime, or [`RegionError::EmptyFederalCache`] if none was loaded.
    pub fn federal(&self) -> Result<&FederalTaxInfo, RegionError> {
        self.federal.as_ref().ok_or(RegionError::EmptyFederalCache)
    }

    /// Resolve a state name for a record that references the state by id.
    ///
    /// A missing state here is a broken cross-reference, not a client error.
    pub fn state_name(&self, state_id: i64) -> Result<&str, RegionError> {
        if let Some(census) = self.census.get_by_id(state_id) {
            return Ok(&census.state_name);
        }
        if let Some(info) = self.state_tax.get_by_id(state_id) {
            return Ok(&info.state_name);
        }
        Err(RegionError::Inconsistent(format!(
            "state {state_id} is referenced but not loaded"
        )))
    }

    /// Census records in load order.
    pub fn states(&self) -> std::slice::Iter<'_, StateCensus> {
        self.census.iter()
    }

    pub fn state_count(&self) -> usize {
        self.census.len()
    }

    pub fn state_tax_count(&self) -> usize {
        self.state_tax.len()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
