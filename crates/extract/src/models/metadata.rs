use serde::{Deserialize, Serialize};

/// Out-of-band marker: the frontmatter field for this date is not configured.
pub const SENTINEL_NOT_CONFIGURED: i64 = i64::MIN;
/// Out-of-band marker: the field is configured but missing or unparseable.
pub const SENTINEL_PARSE_FAILED: i64 = i64::MIN + 1;

/// A frontmatter-derived date.
///
/// Persisted as a single integer: real timestamps are epoch milliseconds,
/// and two values far outside any plausible date range mark the sentinel
/// states. Absence is never used to encode either sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum MetadataDate {
    /// The user has not configured a frontmatter key for this date.
    NotConfigured,
    /// A key is configured, but the value is missing or does not parse.
    ParseFailed,
    /// Epoch milliseconds.
    Timestamp(i64),
}

impl From<i64> for MetadataDate {
    fn from(value: i64) -> Self {
        match value {
            SENTINEL_NOT_CONFIGURED => Self::NotConfigured,
            SENTINEL_PARSE_FAILED => Self::ParseFailed,
            ms => Self::Timestamp(ms),
        }
    }
}

impl From<MetadataDate> for i64 {
    fn from(value: MetadataDate) -> Self {
        match value {
            MetadataDate::NotConfigured => SENTINEL_NOT_CONFIGURED,
            MetadataDate::ParseFailed => SENTINEL_PARSE_FAILED,
            MetadataDate::Timestamp(ms) => ms,
        }
    }
}

/// Display metadata derived from a file's frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Display name; `None` when not configured or not a usable string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub created: MetadataDate,
    pub modified: MetadataDate,
}

impl Default for FileMetadata {
    fn default() -> Self {
        Self {
            name: None,
            created: MetadataDate::NotConfigured,
            modified: MetadataDate::NotConfigured,
        }
    }
}
