//! Tag extraction from the host's cached metadata (no file read).

use folio_vault::FileCache;
use serde_json::Value;

const FRONTMATTER_TAG_KEYS: &[&str] = &["tags", "tag"];

/// All tags of a file, frontmatter tags first, then inline tags.
///
/// Leading `#` is stripped, empty entries are dropped and duplicates removed
/// (first occurrence wins, order otherwise preserved). A missing cache yields
/// no tags.
pub fn extract_tags(cache: Option<&FileCache>) -> Vec<String> {
    let Some(cache) = cache else {
        return Vec::new();
    };
    let mut tags: Vec<String> = Vec::new();
    let mut push = |raw: &str| {
        let tag = raw.trim().trim_start_matches('#').trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    };
    for key in FRONTMATTER_TAG_KEYS {
        match cache.property(key) {
            Some(Value::String(s)) => s.split([',', ' ']).for_each(&mut push),
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(s) => push(s.as_str()),
                        Value::Number(n) => push(&n.to_string()),
                        _ => {},
                    }
                }
            },
            Some(Value::Number(n)) => push(&n.to_string()),
            _ => {},
        }
    }
    for inline in &cache.tags {
        push(inline.as_str());
    }
    tags
}
