//! # Query Parameters
//!
//! Raw query strings are deserialized as optional strings and then validated
//! as a whole. Every problem found is collected so a single 400 response
//! reports all of them.

use serde::Deserialize;

use reregion_core::FilingStatus;
use reregion_tax::Filing;

use crate::error::AppError;

/// How a geographic entity is addressed. A name takes precedence over an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoKey {
    Id(i64),
    Name(String),
}

impl std::fmt::Display for GeoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// `/states` and `/counties` query string.
#[derive(Debug, Default, Deserialize)]
pub struct GeoQuery {
    pub id: Option<String>,
    pub name: Option<String>,
    pub fs: Option<String>,
    pub res: Option<String>,
    pub dep: Option<String>,
    pub income: Option<String>,
}

/// `/state-list` and `/county-list` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub metric_name: Option<String>,
    pub size: Option<String>,
    pub desc: Option<String>,
}

/// `/state-taxes` and `/county-taxes` query string.
#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A validated `/states` or `/counties` request.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRequest {
    pub key: GeoKey,
    pub filing: Filing,
}

/// A validated ranked list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub metric: String,
    pub size: usize,
    pub desc: bool,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts the usual boolean spellings: `1`, `t`, `true`, `0`, `f`, `false`
/// in any case.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

fn parse_key(
    geo: &str,
    id: &Option<String>,
    name: &Option<String>,
    problems: &mut Vec<String>,
) -> Option<GeoKey> {
    match (present(name), present(id)) {
        (Some(name), _) => Some(GeoKey::Name(name.to_string())),
        (None, Some(id)) => match id.parse() {
            Ok(id) => Some(GeoKey::Id(id)),
            Err(_) => {
                problems.push(format!("The provided {geo} id must be an integer."));
                None
            }
        },
        (None, None) => {
            problems.push(format!("A {geo} name or id must be provided."));
            None
        }
    }
}

impl GeoQuery {
    /// Validate a state (`resident_required = false`) or county request.
    pub fn validate(&self, geo: &str, resident_required: bool) -> Result<GeoRequest, AppError> {
        let mut problems = Vec::new();

        let key = parse_key(geo, &self.id, &self.name, &mut problems);

        let status = match present(&self.fs).map(str::parse::<FilingStatus>) {
            Some(Ok(status)) => Some(status),
            _ => {
                problems.push(
                    "The provided filing status must indicate 'S', 'H', or 'M'.".to_string(),
                );
                None
            }
        };

        let resident = match present(&self.res) {
            Some(v) => parse_bool(v),
            None if !resident_required => Some(false),
            None => None,
        };
        if resident.is_none() {
            problems.push("The provided resident flag must be interpretable as a boolean.".to_string());
        }

        let dependents = present(&self.dep).and_then(|v| v.parse::<u32>().ok());
        if dependents.is_none() {
            problems.push(
                "The provided number of dependents must be a non-negative integer.".to_string(),
            );
        }

        let income = present(&self.income)
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|v| *v >= 0);
        if income.is_none() {
            problems.push("The provided income must be a non-negative integer.".to_string());
        }

        match (key, status, resident, dependents, income) {
            (Some(key), Some(status), Some(resident), Some(dependents), Some(income)) => {
                Ok(GeoRequest {
                    key,
                    filing: Filing::new(status, dependents, income, resident),
                })
            }
            _ => Err(AppError::BadRequest(problems)),
        }
    }
}

impl ListQuery {
    pub fn validate(&self) -> Result<ListRequest, AppError> {
        let mut problems = Vec::new();

        let metric = present(&self.metric_name).map(str::to_string);
        if metric.is_none() {
            problems.push("A metric must be provided to generate the list.".to_string());
        }

        let desc = present(&self.desc).and_then(parse_bool);
        if desc.is_none() {
            problems.push(
                "A boolean like value must be given for whether to make the list descending."
                    .to_string(),
            );
        }

        let size = present(&self.size).and_then(|v| v.parse::<usize>().ok());
        if size.is_none() {
            problems.push("The size of the list must be a non-negative integer.".to_string());
        }

        match (metric, size, desc) {
            (Some(metric), Some(size), Some(desc)) => Ok(ListRequest { metric, size, desc }),
            _ => Err(AppError::BadRequest(problems)),
        }
    }
}

impl KeyQuery {
    pub fn validate(&self, geo: &str) -> Result<GeoKey, AppError> {
        let mut problems = Vec::new();
        parse_key(geo, &self.id, &self.name, &mut problems)
            .ok_or(AppError::BadRequest(problems))
    }
}
