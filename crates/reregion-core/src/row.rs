//! # Reference Rows
//!
//! The data source returns flat positional tuples. Each dataset documents its
//! column layout as index constants next to the code that consumes it; this
//! module only knows how to hold values and read them back with a type.

use serde::{Deserialize, Serialize};

use crate::error::RowError;

/// A single untyped column value.
///
/// Deserializes untagged so fixture files can write rows as plain JSON
/// arrays: `[36, "New York", 0.02, null]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Name of the variant, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One row as returned by the data source.
pub type Row = Vec<Value>;

fn column(row: &[Value], index: usize) -> Result<&Value, RowError> {
    row.get(index).ok_or(RowError::MissingColumn {
        index,
        len: row.len(),
    })
}

/// Read an integer column.
pub fn read_int(row: &[Value], index: usize) -> Result<i64, RowError> {
    match column(row, index)? {
        Value::Int(v) => Ok(*v),
        other => Err(RowError::TypeMismatch {
            index,
            expected: "integer",
            found: other.type_name(),
        }),
    }
}

/// Read a float column. Integer values are widened.
pub fn read_float(row: &[Value], index: usize) -> Result<f64, RowError> {
    match column(row, index)? {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        other => Err(RowError::TypeMismatch {
            index,
            expected: "float",
            found: other.type_name(),
        }),
    }
}

/// Read a float column where `NULL` means zero (fees a jurisdiction does not charge).
pub fn read_float_or_zero(row: &[Value], index: usize) -> Result<f64, RowError> {
    match column(row, index)? {
        Value::Null => Ok(0.0),
        _ => read_float(row, index),
    }
}

/// Read a text column.
pub fn read_text(row: &[Value], index: usize) -> Result<&str, RowError> {
    match column(row, index)? {
        Value::Text(v) => Ok(v.as_str()),
        other => Err(RowError::TypeMismatch {
            index,
            expected: "text",
            found: other.type_name(),
        }),
    }
}

/// Read a text column where `NULL` means the empty string.
pub fn read_text_or_empty(row: &[Value], index: usize) -> Result<&str, RowError> {
    match column(row, index)? {
        Value::Null => Ok(""),
        _ => read_text(row, index),
    }
}
