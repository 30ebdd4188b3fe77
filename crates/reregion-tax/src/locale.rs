//! # Tax Locales
//!
//! A locale is a sub-county taxing jurisdiction. Each carries two schedules,
//! one for residents and one for non-residents. A schedule combines a rate on
//! gross income, fixed fees at three periodicities, and a multiplier applied
//! to the state liability.

use serde::Serialize;

use crate::bracket::truncate;

/// Pay periods per year for the per-pay-period fee.
pub const PAY_PERIODS_PER_YEAR: f64 = 26.0;

/// Months per year for the monthly fee.
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Fee and rate schedule of one residency class.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocaleSchedule {
    /// Free-text description of the rate as published, e.g. `"3.078% - 3.876%"`.
    pub desc: String,
    pub rate: f64,
    pub month_fee: f64,
    pub year_fee: f64,
    pub pay_period_fee: f64,
    pub state_rate: f64,
}

impl LocaleSchedule {
    /// Local liability for `income` given the already-computed state liability.
    ///
    /// Each term is truncated toward zero before summing.
    pub fn local_tax(&self, income: i64, state_tax: i64) -> i64 {
        let terms = [
            truncate(income as f64 * self.rate),
            truncate(MONTHS_PER_YEAR * self.month_fee),
            truncate(self.year_fee),
            truncate(PAY_PERIODS_PER_YEAR * self.pay_period_fee),
            truncate(state_tax as f64 * self.state_rate),
        ];
        terms.iter().fold(0i64, |acc, t| acc.saturating_add(*t))
    }
}

/// Static tax information for one locale.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaxLocaleInfo {
    pub locale_id: i64,
    pub locale_name: String,
    pub resident: LocaleSchedule,
    pub nonresident: LocaleSchedule,
}

impl TaxLocaleInfo {
    /// Schedule selected by the residency flag.
    pub fn schedule(&self, resident: bool) -> &LocaleSchedule {
        if resident {
            &self.resident
        } else {
            &self.nonresident
        }
    }
}

/// Flat wire form with one field per schedule attribute.
#[derive(Serialize)]
struct TaxLocaleInfoWire<'a> {
    #[serde(rename = "Locale_id")]
    locale_id: i64,
    #[serde(rename = "Local_name")]
    locale_name: &'a str,
    #[serde(rename = "Resident_desc")]
    resident_desc: &'a str,
    #[serde(rename = "Resident_rate")]
    resident_rate: f64,
    #[serde(rename = "Resident_month_fee")]
    resident_month_fee: f64,
    #[serde(rename = "Resident_year_fee")]
    resident_year_fee: f64,
    #[serde(rename = "Resident_pay_period_fee")]
    resident_pay_period_fee: f64,
    #[serde(rename = "Resident_state_rate")]
    resident_state_rate: f64,
    #[serde(rename = "Nonresident_desc")]
    nonresident_desc: &'a str,
    #[serde(rename = "Nonresident_rate")]
    nonresident_rate: f64,
    #[serde(rename = "Nonresident_month_fee")]
    nonresident_month_fee: f64,
    #[serde(rename = "Nonresident_year_fee")]
    nonresident_year_fee: f64,
    #[serde(rename = "Nonresident_pay_period_fee")]
    nonresident_pay_period_fee: f64,
    #[serde(rename = "Nonresident_state_rate")]
    nonresident_state_rate: f64,
}

impl Serialize for TaxLocaleInfo {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (r, n) = (&self.resident, &self.nonresident);
        TaxLocaleInfoWire {
            locale_id: self.locale_id,
            locale_name: &self.locale_name,
            resident_desc: &r.desc,
            resident_rate: r.rate,
            resident_month_fee: r.month_fee,
            resident_year_fee: r.year_fee,
            resident_pay_period_fee: r.pay_period_fee,
            resident_state_rate: r.state_rate,
            nonresident_desc: &n.desc,
            nonresident_rate: n.rate,
            nonresident_month_fee: n.month_fee,
            nonresident_year_fee: n.year_fee,
            nonresident_pay_period_fee: n.pay_period_fee,
            nonresident_state_rate: n.state_rate,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> LocaleSchedule {
        LocaleSchedule {
            desc: "test".into(),
            rate: 0.01,
            month_fee: 2.5,
            year_fee: 10.9,
            pay_period_fee: 0.5,
            state_rate: 0.25,
        }
    }

    #[test]
    fn local_tax_sums_truncated_terms() {
        // 500 + 30 + 10 + 13 + 250
        assert_eq!(schedule().local_tax(50_000, 1000), 803);
    }

    #[test]
    fn state_rate_multiplies_by_real_rate() {
        let s = LocaleSchedule {
            state_rate: 0.5,
            ..Default::default()
        };
        assert_eq!(s.local_tax(0, 4380), 2190);
    }

    #[test]
    fn zero_schedule_yields_zero() {
        assert_eq!(LocaleSchedule::default().local_tax(93_651, 4380), 0);
    }

    #[test]
    fn residency_flag_selects_schedule() {
        let info = TaxLocaleInfo {
            locale_id: 3376,
            locale_name: "New York City".into(),
            resident: schedule(),
            nonresident: LocaleSchedule::default(),
        };
        assert_eq!(info.schedule(true).rate, 0.01);
        assert_eq!(info.schedule(false).rate, 0.0);
    }

    #[test]
    fn serializes_flat_resident_and_nonresident_fields() {
        let info = TaxLocaleInfo {
            locale_id: 3376,
            locale_name: "New York City".into(),
            resident: LocaleSchedule {
                desc: "3.078% - 3.876%".into(),
                ..Default::default()
            },
            nonresident: LocaleSchedule {
                desc: "0.00%".into(),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["Locale_id"], 3376);
        assert_eq!(json["Local_name"], "New York City");
        assert_eq!(json["Resident_desc"], "3.078% - 3.876%");
        assert_eq!(json["Nonresident_desc"], "0.00%");
        assert_eq!(json["Nonresident_state_rate"], 0.0);
    }
}
