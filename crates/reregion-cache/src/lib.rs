//! # reregion-cache
//!
//! Reference data caches and entity assembly.
//!
//! - [`source`]: the [`DataSource`] contract and per-dataset column layouts.
//! - [`reference`]: write-once state census, state regimes and federal regime,
//!   addressable by id and by normalized name.
//! - [`ranked`]: per-metric ascending/descending state orderings.
//! - [`county`]: counties materialized on first request.
//! - [`entities`]: the public response shapes.
//! - [`service`]: [`RegionService`], which ties the above to the tax engine.
//! - [`memory`]: an in-memory [`DataSource`] for tests and fixture mode.

pub mod census;
pub mod county;
pub mod entities;
pub mod memory;
pub mod ranked;
pub mod reference;
pub mod service;
pub mod source;

#[cfg(test)]
mod testing;

pub use census::{CensusMetric, CensusMetrics};
pub use county::{CountyCache, CountyRecord};
pub use entities::{
    County, CountyList, CountyMetricPair, CountyTaxList, State, StateList,
    StateMetricPair, TaxLocale,
};
pub use memory::MemorySource;
pub use ranked::{RankedEntry, RankedList, RankedListCache};
pub use reference::{ReferenceCache, ReferenceCacheBuilder, StateCensus};
pub use service::{RegionService, ServiceStats};
pub use source::DataSource;
