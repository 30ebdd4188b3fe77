//! # reregion-core: Foundational Types for the Re-Region API
//!
//! Every other crate in the workspace depends on `reregion-core`; it depends
//! on nothing internal.
//!
//! ## Contents
//!
//! - **Error taxonomy.** [`ErrorKind::NotFound`], [`ErrorKind::Ambiguous`]
//!   and [`ErrorKind::Internal`]. Every error type in the workspace reports one
//!   of them so the HTTP boundary can map it to a status code without
//!   inspecting variants.
//!
//! - **Untyped rows.** The data source hands back flat positional tuples
//!   ([`Row`]). Typed readers ([`row::read_int`], [`row::read_float`],
//!   [`row::read_text`]) decode a column by index and fail loudly on shape
//!   mismatches instead of defaulting to zero.
//!
//! - **Filing status.** [`FilingStatus`] selects deduction, exemption, and
//!   bracket variants in the tax engine.
//!
//! - **Name normalization.** Lookups by name go through [`names`] so the
//!   cache keys and request keys agree.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `reregion-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod filing;
pub mod names;
pub mod row;

pub use error::{Dataset, EntityKind, ErrorKind, RegionError, RowError, SourceError};
pub use filing::{FilingStatus, ParseFilingStatusError};
pub use row::{Row, Value};
