//! # reregion-tax: Tax Computation Engine
//!
//! Pure functions and value types for resolving tax liability from reference
//! data. Nothing here performs I/O or holds shared state.
//!
//! - [`bracket`]: ordered `(threshold, rate)` lists and the flat-rate lookup.
//! - [`regime`]: state and federal regimes with per-status constants.
//! - [`locale`]: sub-county resident and non-resident schedules.
//! - [`liability`]: composition of state, federal, and local figures.

pub mod bracket;
pub mod liability;
pub mod locale;
pub mod regime;

#[cfg(test)]
mod testing;

pub use bracket::{BracketEntry, BracketList};
pub use liability::{compute_liability, compute_local_liability, Filing, Liability, LocalLiability};
pub use locale::{LocaleSchedule, TaxLocaleInfo};
pub use regime::{FederalDeductions, FederalTaxInfo, StateAllowances, StateTaxInfo};
