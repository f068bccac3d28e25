//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Reading from or writing to the content store failed.
    #[display("content store error")]
    Store,
    /// The content of a single file could not be read.
    #[display("could not read {_0}")]
    Read(#[error(not(source))] String),
    /// The host has no cached metadata for this file yet.
    #[display("{_0} is not indexed yet")]
    NotIndexed(#[error(not(source))] String),
}
