//! Feature image resolution.

use crate::consts::{MARKDOWN_TARGET_REGEX, WIKILINK_TARGET_REGEX};
use folio_vault::{FileCache, Vault, VaultFile};
use serde_json::Value;

/// Find the feature image of `file`.
///
/// Frontmatter properties are tried in priority order; each may hold a
/// plain path, a wikilink (`[[cover.png|alias]]`), markdown image syntax
/// (`![](cover.png)`) or an external `http(s)` URL, which is kept verbatim.
/// Vault links must resolve to an image file. When no property yields an
/// image, the first embed that resolves to one wins. Returns `""` if nothing
/// is found.
pub fn extract_feature_image(file: &VaultFile, cache: Option<&FileCache>, properties: &[String], vault: &dyn Vault) -> String {
    let Some(cache) = cache else {
        return String::new();
    };
    properties
        .iter()
        .filter_map(|key| property_target(cache.property(key)))
        .chain(cache.embeds.iter().map(|embed| embed.link.as_str()))
        .find_map(|target| resolve_target(target, &file.path, vault))
        .unwrap_or_default()
}

fn property_target(value: Option<&Value>) -> Option<&str> {
    match value? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.first().and_then(Value::as_str),
        _ => None,
    }
}

fn resolve_target(raw: &str, source_path: &str, vault: &dyn Vault) -> Option<String> {
    let raw = raw.trim();
    let target = WIKILINK_TARGET_REGEX
        .captures(raw)
        .or_else(|| MARKDOWN_TARGET_REGEX.captures(raw))
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str());
    let target = target.split('|').next().unwrap_or(target).trim();
    if target.is_empty() {
        return None;
    }
    if is_external(target) {
        return Some(target.to_string());
    }
    let target = target.replace("%20", " ");
    vault.resolve_link(&target, source_path).filter(VaultFile::is_image).map(|image| image.path)
}

fn is_external(target: &str) -> bool {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_vault::MockVault;
    use rstest::rstest;
    use serde_json::json;

    fn vault() -> MockVault {
        MockVault::default()
            .with_file("notes/post.md", 1, "")
            .with_file("notes/local.png", 1, "")
            .with_file("assets/cover image.jpg", 1, "")
            .with_file("assets/other.webp", 1, "")
            .with_file("notes/linked.md", 1, "")
    }

    fn cache(frontmatter: Value) -> FileCache {
        let Value::Object(map) = frontmatter else {
            panic!("frontmatter must be an object");
        };
        FileCache::default().with_frontmatter(map)
    }

    fn props() -> Vec<String> {
        vec!["thumbnail".to_string(), "feature".to_string()]
    }

    #[rstest]
    #[case(json!({"feature": "local.png"}), "notes/local.png")]
    #[case(json!({"feature": "[[cover image.jpg|Cover]]"}), "assets/cover image.jpg")]
    #[case(json!({"feature": "![[other.webp]]"}), "assets/other.webp")]
    #[case(json!({"feature": "![alt](assets/cover%20image.jpg)"}), "assets/cover image.jpg")]
    #[case(json!({"feature": ["other.webp", "local.png"]}), "assets/other.webp")]
    #[case(json!({"feature": "https://example.com/a.png"}), "https://example.com/a.png")]
    #[case(json!({"feature": "![remote](HTTPS://example.com/b.png)"}), "HTTPS://example.com/b.png")]
    #[case(json!({"thumbnail": "other.webp", "feature": "local.png"}), "assets/other.webp")]
    #[case(json!({"thumbnail": "missing.png", "feature": "local.png"}), "notes/local.png")]
    #[case(json!({"feature": "[[linked]]"}), "")]
    #[case(json!({"feature": 42}), "")]
    #[case(json!({"unrelated": "local.png"}), "")]
    fn from_properties(#[case] frontmatter: Value, #[case] expected: &str) {
        let vault = vault();
        let file = vault.get("notes/post.md").unwrap();
        let found = extract_feature_image(&file, Some(&cache(frontmatter)), &props(), &vault);
        assert_eq!(found, expected);
    }

    #[test]
    fn falls_back_to_first_image_embed() {
        let vault = vault();
        let file = vault.get("notes/post.md").unwrap();
        let cache = FileCache::default().with_embeds(["linked", "missing.png", "other.webp|200", "local.png"]);
        assert_eq!(extract_feature_image(&file, Some(&cache), &props(), &vault), "assets/other.webp");
    }

    #[test]
    fn no_cache_no_image() {
        let vault = vault();
        let file = vault.get("notes/post.md").unwrap();
        assert_eq!(extract_feature_image(&file, None, &props(), &vault), "");
    }
}
