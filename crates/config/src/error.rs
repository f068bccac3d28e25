//! Config Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, matching the other crates in the workspace.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// One of the configuration sources could not be read or deserialized.
    #[display("could not load configuration")]
    Load,
    /// The configuration file extension is not one of TOML, YAML or JSON.
    #[display("unsupported configuration format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// A numeric limit was configured outside its valid range.
    #[display("invalid limit: {_0} must be greater than zero")]
    InvalidLimit(#[error(not(source))] &'static str),
    /// No platform cache directory could be determined.
    #[display("could not determine a cache directory for this platform")]
    NoCacheDirectory,
}
