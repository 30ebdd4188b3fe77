//! # Filing Status
//!
//! Selects which deduction, exemption, and bracket variant applies.
//!
//! Accepted spellings are the single-letter codes `h`, `s`, `m` and the full
//! words `head`, `single`, `married`, all case-insensitive.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Filing status of the taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingStatus {
    /// Head of household.
    Head,
    Single,
    Married,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [Self::Head, Self::Single, Self::Married];

    /// Single-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Head => "h",
            Self::Single => "s",
            Self::Married => "m",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Single => "single",
            Self::Married => "married",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The input did not name a filing status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0:?} is not a valid filing status (expected h, s, or m)")]
pub struct ParseFilingStatusError(pub String);

impl FromStr for FilingStatus {
    type Err = ParseFilingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "head" => Ok(Self::Head),
            "s" | "single" => Ok(Self::Single),
            "m" | "married" => Ok(Self::Married),
            _ => Err(ParseFilingStatusError(s.to_string())),
        }
    }
}
