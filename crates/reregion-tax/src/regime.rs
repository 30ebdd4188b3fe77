//! # Tax Regimes
//!
//! [`StateTaxInfo`] and [`FederalTaxInfo`] hold the deduction and exemption
//! constants of a jurisdiction plus one [`BracketList`] per filing variant.
//!
//! States publish two variants (single, married); head-of-household filers use
//! the single variant. The federal regime publishes all three.

use serde::Serialize;

use reregion_core::{FilingStatus, RegionError};

use crate::bracket::{BracketEntry, BracketList};

/// Subtract deduction and per-dependent exemption from gross income, floored at zero.
pub fn taxable_income(income: i64, deduction: i64, exemption: i64, dependents: u32) -> i64 {
    let exemptions = exemption.saturating_mul(i64::from(dependents));
    income
        .saturating_sub(deduction)
        .saturating_sub(exemptions)
        .max(0)
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Deduction and exemption constants of a state, shared by all of its brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateAllowances {
    pub single_deduction: i64,
    pub married_deduction: i64,
    pub single_exemption: i64,
    pub married_exemption: i64,
    pub dependent_exemption: i64,
}

/// State tax regime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTaxInfo {
    #[serde(rename = "State_id")]
    pub state_id: i64,
    #[serde(rename = "State_name")]
    pub state_name: String,
    #[serde(rename = "Single_deduction")]
    pub single_deduction: i64,
    #[serde(rename = "Married_deduction")]
    pub married_deduction: i64,
    #[serde(rename = "Single_exemption")]
    pub single_exemption: i64,
    #[serde(rename = "Married_exemption")]
    pub married_exemption: i64,
    #[serde(rename = "Dependent_exemption")]
    pub dependent_exemption: i64,
    #[serde(rename = "Bracket_list")]
    brackets: StateBrackets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct StateBrackets {
    #[serde(rename = "Single")]
    single: BracketList,
    #[serde(rename = "Married")]
    married: BracketList,
}

impl StateTaxInfo {
    /// Create a regime with no brackets. Brackets are appended with
    /// [`StateTaxInfo::push_bracket`] while the reference cache is loading.
    pub fn new(state_id: i64, state_name: impl Into<String>, allowances: StateAllowances) -> Self {
        Self {
            state_id,
            state_name: state_name.into(),
            single_deduction: allowances.single_deduction,
            married_deduction: allowances.married_deduction,
            single_exemption: allowances.single_exemption,
            married_exemption: allowances.married_exemption,
            dependent_exemption: allowances.dependent_exemption,
            brackets: StateBrackets::default(),
        }
    }

    /// Append one bracket row (a single entry and a married entry).
    pub fn push_bracket(&mut self, single: BracketEntry, married: BracketEntry) {
        self.brackets.single.insert_ordered(single);
        self.brackets.married.insert_ordered(married);
    }

    pub fn single_brackets(&self) -> &BracketList {
        &self.brackets.single
    }

    pub fn married_brackets(&self) -> &BracketList {
        &self.brackets.married
    }

    /// Bracket variant for `status`. Head of household shares the single schedule.
    pub fn brackets(&self, status: FilingStatus) -> &BracketList {
        match status {
            FilingStatus::Head | FilingStatus::Single => &self.brackets.single,
            FilingStatus::Married => &self.brackets.married,
        }
    }

    pub fn deduction(&self, status: FilingStatus) -> i64 {
        match status {
            FilingStatus::Head | FilingStatus::Single => self.single_deduction,
            FilingStatus::Married => self.married_deduction,
        }
    }

    /// Per-dependent exemption for `status`.
    pub fn exemption(&self, status: FilingStatus) -> i64 {
        match status {
            FilingStatus::Head | FilingStatus::Single => self.single_exemption,
            FilingStatus::Married => self.married_exemption,
        }
    }

    pub fn taxable_income(&self, status: FilingStatus, dependents: u32, income: i64) -> i64 {
        taxable_income(
            income,
            self.deduction(status),
            self.exemption(status),
            dependents,
        )
    }

    /// State liability for the given filing parameters.
    pub fn liability(&self, status: FilingStatus, dependents: u32, income: i64) -> i64 {
        let taxable = self.taxable_income(status, dependents, income);
        self.brackets(status).liability_for(taxable)
    }

    /// Reject a regime that finished loading with an empty bracket variant.
    pub fn validate(&self) -> Result<(), RegionError> {
        for (variant, list) in [
            ("single", &self.brackets.single),
            ("married", &self.brackets.married),
        ] {
            if list.is_empty() {
                return Err(RegionError::EmptyBrackets {
                    regime: format!("state {}", self.state_id),
                    variant,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Federal
// ---------------------------------------------------------------------------

/// Standard deductions of the federal regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FederalDeductions {
    pub single: i64,
    pub married: i64,
    pub head: i64,
}

/// Federal tax regime. Exemptions are not modeled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FederalTaxInfo {
    #[serde(rename = "Single_deduction")]
    pub single_deduction: i64,
    #[serde(rename = "Married_deduction")]
    pub married_deduction: i64,
    #[serde(rename = "Head_deduction")]
    pub head_deduction: i64,
    #[serde(rename = "Bracket_list")]
    brackets: FederalBrackets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct FederalBrackets {
    #[serde(rename = "Single")]
    single: BracketList,
    #[serde(rename = "Married")]
    married: BracketList,
    #[serde(rename = "Head")]
    head: BracketList,
}

impl FederalTaxInfo {
    pub fn new(deductions: FederalDeductions) -> Self {
        Self {
            single_deduction: deductions.single,
            married_deduction: deductions.married,
            head_deduction: deductions.head,
            brackets: FederalBrackets::default(),
        }
    }

    /// Append one federal row: a rate shared by three variant thresholds.
    pub fn push_bracket(&mut self, rate: f64, single: i64, married: i64, head: i64) {
        self.brackets.single.insert_ordered(BracketEntry::new(single, rate));
        self.brackets.married.insert_ordered(BracketEntry::new(married, rate));
        self.brackets.head.insert_ordered(BracketEntry::new(head, rate));
    }

    pub fn brackets(&self, status: FilingStatus) -> &BracketList {
        match status {
            FilingStatus::Head => &self.brackets.head,
            FilingStatus::Single => &self.brackets.single,
            FilingStatus::Married => &self.brackets.married,
        }
    }

    pub fn deduction(&self, status: FilingStatus) -> i64 {
        match status {
            FilingStatus::Head => self.head_deduction,
            FilingStatus::Single => self.single_deduction,
            FilingStatus::Married => self.married_deduction,
        }
    }

    /// Gross income less the federal deduction, floored at zero.
    pub fn taxable_income(&self, status: FilingStatus, income: i64) -> i64 {
        taxable_income(income, self.deduction(status), 0, 0)
    }

    pub fn liability(&self, status: FilingStatus, income: i64) -> i64 {
        let taxable = self.taxable_income(status, income);
        self.brackets(status).liability_for(taxable)
    }

    pub fn validate(&self) -> Result<(), RegionError> {
        for (variant, list) in [
            ("single", &self.brackets.single),
            ("married", &self.brackets.married),
            ("head", &self.brackets.head),
        ] {
            if list.is_empty() {
                return Err(RegionError::EmptyBrackets {
                    regime: "federal".to_string(),
                    variant,
                });
            }
        }
        Ok(())
    }
}
