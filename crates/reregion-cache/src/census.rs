//! Census metrics shared by states and counties.

use std::fmt;
use std::str::FromStr;

use reregion_core::row::read_int;
use reregion_core::{Row, RowError};

/// Demographic metrics of a state or county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CensusMetrics {
    pub pop: i64,
    pub male_pop: i64,
    pub female_pop: i64,
    pub median_income: i64,
    pub average_rent: i64,
    pub commute: i64,
}

impl CensusMetrics {
    /// Read six consecutive metric columns starting at `first`, in
    /// [`CensusMetric::ALL`] order.
    pub fn read(row: &Row, first: usize) -> Result<Self, RowError> {
        Ok(Self {
            pop: read_int(row, first)?,
            male_pop: read_int(row, first + 1)?,
            female_pop: read_int(row, first + 2)?,
            median_income: read_int(row, first + 3)?,
            average_rent: read_int(row, first + 4)?,
            commute: read_int(row, first + 5)?,
        })
    }

    pub fn get(&self, metric: CensusMetric) -> i64 {
        match metric {
            CensusMetric::Pop => self.pop,
            CensusMetric::MalePop => self.male_pop,
            CensusMetric::FemalePop => self.female_pop,
            CensusMetric::MedianIncome => self.median_income,
            CensusMetric::AverageRent => self.average_rent,
            CensusMetric::Commute => self.commute,
        }
    }
}

/// A rankable census metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CensusMetric {
    Pop,
    MalePop,
    FemalePop,
    MedianIncome,
    AverageRent,
    Commute,
}

impl CensusMetric {
    /// Column order used by both the census and county layouts.
    pub const ALL: [CensusMetric; 6] = [
        Self::Pop,
        Self::MalePop,
        Self::FemalePop,
        Self::MedianIncome,
        Self::AverageRent,
        Self::Commute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pop => "pop",
            Self::MalePop => "male_pop",
            Self::FemalePop => "female_pop",
            Self::MedianIncome => "median_income",
            Self::AverageRent => "average_rent",
            Self::Commute => "commute",
        }
    }

    /// Offset from the first metric column.
    pub fn offset(&self) -> usize {
        match self {
            Self::Pop => 0,
            Self::MalePop => 1,
            Self::FemalePop => 2,
            Self::MedianIncome => 3,
            Self::AverageRent => 4,
            Self::Commute => 5,
        }
    }
}

impl fmt::Display for CensusMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CensusMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}
