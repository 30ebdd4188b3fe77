//! Reference rows shared by unit tests.

use std::collections::BTreeSet;

use reregion_core::{Row, Value};

use crate::memory::MemorySource;

fn row(values: Vec<Value>) -> Row {
    values
}

pub(crate) fn census_rows() -> Vec<Row> {
    vec![
        row(vec![
            36.into(),
            "New York".into(),
            18466230.into(),
            8953064.into(),
            9513166.into(),
            77578.into(),
            1381.into(),
            17.into(),
        ]),
        row(vec![
            42.into(),
            "Pennsylvania".into(),
            11847115.into(),
            5789105.into(),
            6058010.into(),
            66408.into(),
            993.into(),
            11.into(),
        ]),
        row(vec![
            54.into(),
            "West Virginia".into(),
            718987.into(),
            353641.into(),
            365346.into(),
            51001.into(),
            773.into(),
            9.into(),
        ]),
        row(vec![
            29.into(),
            "Missouri".into(),
            4182675.into(),
            2033524.into(),
            2149151.into(),
            63688.into(),
            915.into(),
            11.into(),
        ]),
    ]
}

pub(crate) fn state_tax_rows() -> Vec<Row> {
    let ny = |single_rate: f64, single: i64, married_rate: f64, married: i64| -> Row {
        vec![
            36.into(),
            "New York".into(),
            2500.into(),
            7500.into(),
            1500.into(),
            3000.into(),
            1000.into(),
            single_rate.into(),
            single.into(),
            married_rate.into(),
            married.into(),
        ]
    };
    vec![ny(0.02, 0, 0.02, 0), ny(0.12, 500, 0.12, 1000)]
}

pub(crate) fn federal_rows() -> Vec<Row> {
    let fed = |rate: f64, single: i64, married: i64, head: i64| -> Row {
        vec![
            rate.into(),
            single.into(),
            married.into(),
            head.into(),
            12950.into(),
            25900.into(),
            19400.into(),
        ]
    };
    vec![
        fed(0.10, 0, 0, 0),
        fed(0.12, 10275, 20550, 14650),
        fed(0.22, 41775, 83550, 55900),
    ]
}

/// New York County with one locale (New York City) and zero local rates.
pub(crate) fn county_rows() -> Vec<Row> {
    vec![county_row(36061, "New York County", 36, 3376, "New York City", 0.0)]
}

pub(crate) fn county_row(
    county_id: i64,
    county_name: &str,
    state_id: i64,
    locale_id: i64,
    locale_name: &str,
    resident_rate: f64,
) -> Row {
    vec![
        county_id.into(),
        county_name.into(),
        state_id.into(),
        1628706.into(),
        771278.into(),
        857428.into(),
        93651.into(),
        1753.into(),
        81.into(),
        locale_id.into(),
        locale_name.into(),
        "3.078% - 3.876%".into(),
        resident_rate.into(),
        0.0.into(),
        0.0.into(),
        0.0.into(),
        0.0.into(),
        "0.00%".into(),
        0.0.into(),
        0.0.into(),
        0.0.into(),
        0.0.into(),
        0.0.into(),
    ]
}

pub(crate) fn metric_names() -> BTreeSet<String> {
    crate::census::CensusMetric::ALL
        .iter()
        .map(|m| m.as_str().to_string())
        .collect()
}

pub(crate) fn memory_source() -> MemorySource {
    MemorySource::new()
        .with_state_census(census_rows())
        .with_state_tax(state_tax_rows())
        .with_federal_tax(federal_rows())
        .with_counties(county_rows())
        .with_metric_names(metric_names())
}
