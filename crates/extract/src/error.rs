//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Extraction itself is infallible: missing or malformed inputs produce
//! empty values or sentinels. Only configuration can be rejected.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured date format is not a valid `time` format description.
    #[display("invalid date format: {_0}")]
    InvalidDateFormat(#[error(not(source))] String),
}
