//! Shared regimes for unit tests.

use crate::bracket::BracketEntry;
use crate::regime::{FederalDeductions, FederalTaxInfo, StateAllowances, StateTaxInfo};

pub(crate) fn new_york() -> StateTaxInfo {
    let mut info = StateTaxInfo::new(
        36,
        "New York",
        StateAllowances {
            single_deduction: 2500,
            married_deduction: 7500,
            single_exemption: 1500,
            married_exemption: 3000,
            dependent_exemption: 1000,
        },
    );
    info.push_bracket(BracketEntry::new(0, 0.02), BracketEntry::new(0, 0.02));
    info.push_bracket(BracketEntry::new(500, 0.12), BracketEntry::new(1000, 0.12));
    info
}

pub(crate) fn federal() -> FederalTaxInfo {
    let mut info = FederalTaxInfo::new(FederalDeductions {
        single: 12950,
        married: 25900,
        head: 19400,
    });
    info.push_bracket(0.10, 0, 0, 0);
    info.push_bracket(0.12, 10275, 20550, 14650);
    info.push_bracket(0.22, 41775, 83550, 55900);
    info
}
