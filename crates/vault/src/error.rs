//! Vault Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A vault error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for vault operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File does not exist in the vault (it may have been deleted since it
    /// was listed).
    #[display("file not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Path is empty, contains invalid characters, or escapes the vault root.
    #[display("invalid path: {_0}")]
    InvalidPath(#[error(not(source))] String),
    /// The file exists but its contents could not be read as text.
    #[display("unreadable file: {_0}")]
    Unreadable(#[error(not(source))] String),
    /// The host application reported an error of its own.
    #[display("host error: {_0}")]
    Host(#[error(not(source))] String),
}
