//! Frontmatter-derived display metadata.

use crate::dates::DateParser;
use crate::models::{FileMetadata, MetadataDate};
use folio_vault::FileCache;
use serde_json::Value;

/// Which frontmatter keys feed [`FileMetadata`], and how dates are parsed.
///
/// An empty key means the sub-field is not configured. `dates` is `None`
/// when the configured date format itself is invalid; every configured
/// date then fails to parse.
#[derive(Debug, Clone)]
pub struct MetadataFields {
    pub name: String,
    pub created: String,
    pub modified: String,
    pub dates: Option<DateParser>,
}

/// Derive name/created/modified from the cached frontmatter.
///
/// - Unconfigured key: `None` for the name, [`MetadataDate::NotConfigured`]
///   for dates. Writing this out clears values stored while the key was set.
/// - Configured key that is missing or unparseable: `None` for the name,
///   [`MetadataDate::ParseFailed`] for dates.
/// - Otherwise the trimmed name or the epoch-millisecond timestamp.
pub fn extract_metadata(cache: Option<&FileCache>, fields: &MetadataFields) -> FileMetadata {
    let lookup = |key: &str| cache.and_then(|c| c.property(key));
    let name = match fields.name.trim() {
        "" => None,
        key => match lookup(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        },
    };
    let date = |key: &str| match key.trim() {
        "" => MetadataDate::NotConfigured,
        key => lookup(key)
            .zip(fields.dates.as_ref())
            .and_then(|(value, parser)| parser.parse_value(value))
            .map_or(MetadataDate::ParseFailed, MetadataDate::Timestamp),
    };
    FileMetadata { name, created: date(&fields.created), modified: date(&fields.modified) }
}
