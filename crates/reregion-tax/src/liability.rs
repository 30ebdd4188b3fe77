//! # Liability Composition
//!
//! Combines state, federal, and (for county requests) locality liabilities
//! into the figures returned with a state or county.
//!
//! State taxable income subtracts the state deduction and a per-dependent
//! exemption for the filing status. Federal taxable income subtracts only the
//! federal deduction, computed from the same gross income.

use reregion_core::FilingStatus;

use crate::locale::TaxLocaleInfo;
use crate::regime::{FederalTaxInfo, StateTaxInfo};

/// Filing parameters of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filing {
    pub status: FilingStatus,
    pub dependents: u32,
    /// Gross yearly income.
    pub income: i64,
    /// Selects the resident locale schedule. Ignored for state requests.
    pub resident: bool,
}

impl Filing {
    pub fn new(status: FilingStatus, dependents: u32, income: i64, resident: bool) -> Self {
        Self {
            status,
            dependents,
            income,
            resident,
        }
    }
}

impl Default for Filing {
    fn default() -> Self {
        Self::new(FilingStatus::Single, 0, 0, false)
    }
}

/// State and federal liability with their sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Liability {
    pub state_tax: i64,
    pub federal_tax: i64,
    pub total: i64,
}

/// Liability with a locality component added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalLiability {
    pub state_tax: i64,
    pub federal_tax: i64,
    pub locale_tax: i64,
    pub total: i64,
}

/// Compute state and federal liability for one filer.
pub fn compute_liability(
    status: FilingStatus,
    dependents: u32,
    income: i64,
    state: &StateTaxInfo,
    federal: &FederalTaxInfo,
) -> Liability {
    let state_tax = state.liability(status, dependents, income);
    let federal_tax = federal.liability(status, income);
    Liability {
        state_tax,
        federal_tax,
        total: state_tax.saturating_add(federal_tax),
    }
}

/// Compute state, federal, and locality liability for one locale.
pub fn compute_local_liability(
    filing: &Filing,
    state: &StateTaxInfo,
    federal: &FederalTaxInfo,
    locale: &TaxLocaleInfo,
) -> LocalLiability {
    let base = compute_liability(
        filing.status,
        filing.dependents,
        filing.income,
        state,
        federal,
    );
    let locale_tax = locale
        .schedule(filing.resident)
        .local_tax(filing.income, base.state_tax);
    LocalLiability {
        state_tax: base.state_tax,
        federal_tax: base.federal_tax,
        locale_tax,
        total: base.total.saturating_add(locale_tax),
    }
}
