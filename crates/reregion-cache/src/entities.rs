//! # Response Entities
//!
//! Public shapes returned by [`RegionService`](crate::service::RegionService).
//! Field names on the wire are the established API names (`State_id`,
//! `Total_tax`, `Ranked_list`, ...).

use serde::Serialize;

use reregion_tax::TaxLocaleInfo;

use crate::census::CensusMetrics;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// A state with census metrics and the liability for one filing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct State {
    #[serde(rename = "State_id")]
    pub state_id: i64,
    #[serde(rename = "State_name")]
    pub state_name: String,
    #[serde(flatten)]
    pub metrics: MetricsWire,
    #[serde(rename = "Total_tax")]
    pub total_tax: i64,
    #[serde(rename = "State_tax")]
    pub state_tax: i64,
    #[serde(rename = "Federal_tax")]
    pub federal_tax: i64,
}

/// Census metrics with their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsWire {
    #[serde(rename = "Pop")]
    pub pop: i64,
    #[serde(rename = "Male_pop")]
    pub male_pop: i64,
    #[serde(rename = "Female_pop")]
    pub female_pop: i64,
    #[serde(rename = "Median_income")]
    pub median_income: i64,
    #[serde(rename = "Average_rent")]
    pub average_rent: i64,
    #[serde(rename = "Commute")]
    pub commute: i64,
}

impl From<CensusMetrics> for MetricsWire {
    fn from(m: CensusMetrics) -> Self {
        Self {
            pop: m.pop,
            male_pop: m.male_pop,
            female_pop: m.female_pop,
            median_income: m.median_income,
            average_rent: m.average_rent,
            commute: m.commute,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateMetricPair {
    #[serde(rename = "State_id")]
    pub state_id: i64,
    #[serde(rename = "State_name")]
    pub state_name: String,
    #[serde(rename = "Metric_value")]
    pub metric_value: i64,
}

/// The first `n` states for a metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateList {
    #[serde(rename = "Metric_name")]
    pub metric_name: String,
    #[serde(rename = "Ranked_list")]
    pub ranked_list: Vec<StateMetricPair>,
}

// ---------------------------------------------------------------------------
// Counties
// ---------------------------------------------------------------------------

/// Liability for one filing within one tax locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxLocale {
    #[serde(rename = "Locale_id")]
    pub locale_id: i64,
    #[serde(rename = "Locale_name")]
    pub locale_name: String,
    #[serde(rename = "Total_tax")]
    pub total_tax: i64,
    #[serde(rename = "Federal_tax")]
    pub federal_tax: i64,
    #[serde(rename = "State_tax")]
    pub state_tax: i64,
    #[serde(rename = "Locale_tax")]
    pub locale_tax: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct County {
    #[serde(rename = "County_id")]
    pub county_id: i64,
    #[serde(rename = "County_name")]
    pub county_name: String,
    #[serde(rename = "State_id")]
    pub state_id: i64,
    #[serde(rename = "State_name")]
    pub state_name: String,
    #[serde(flatten)]
    pub metrics: MetricsWire,
    #[serde(rename = "Tax_locale")]
    pub tax_locale: Vec<TaxLocale>,
}

/// Tax schedules of every locale in a county.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyTaxList {
    #[serde(rename = "County_name")]
    pub county_name: String,
    #[serde(rename = "County_id")]
    pub county_id: i64,
    #[serde(rename = "State_name")]
    pub state_name: String,
    #[serde(rename = "State_id")]
    pub state_id: i64,
    #[serde(rename = "Tax_locales")]
    pub tax_locales: Vec<TaxLocaleInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyMetricPair {
    #[serde(rename = "County_id")]
    pub county_id: i64,
    #[serde(rename = "County_name")]
    pub county_name: String,
    #[serde(rename = "State_id")]
    pub state_id: i64,
    #[serde(rename = "State_name")]
    pub state_name: String,
    #[serde(rename = "Metric_value")]
    pub metric_value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyList {
    #[serde(rename = "Metric_name")]
    pub metric_name: String,
    #[serde(rename = "Ranked_list")]
    pub ranked_list: Vec<CountyMetricPair>,
}
