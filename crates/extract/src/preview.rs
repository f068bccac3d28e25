//! Preview text: a short, plain-text rendition of a note's body.

use crate::consts::{
    BOLD_STAR_REGEX, BOLD_UNDERSCORE_REGEX, CALLOUT_REGEX, COMMENT_REGEX, EMBED_REGEX, FENCE_REGEX, FOOTNOTE_REGEX,
    FRONTMATTER_REGEX, HEADING_CLOSING_REGEX, HEADING_REGEX, HIGHLIGHT_REGEX, HTML_TAG_REGEX, IMAGE_REGEX,
    INLINE_CODE_REGEX, ITALIC_STAR_REGEX, ITALIC_UNDERSCORE_REGEX, LINK_REGEX, LIST_REGEX, QUOTE_REGEX, RULE_REGEX,
    STRIKE_REGEX, TABLE_SEPARATOR_REGEX, WHITESPACE_REGEX, WIKILINK_ALIAS_REGEX, WIKILINK_REGEX,
};
use crate::truncate::{PREVIEW_MAX_CHARS, truncate_preview};
use folio_vault::FileCache;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

/// Settings that shape the preview text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewOptions {
    pub skip_headings: bool,
    pub skip_code_blocks: bool,
    /// Frontmatter properties that override the generated preview.
    pub properties: Vec<String>,
}

/// Build the preview text for a note.
///
/// A non-empty string in one of the configured preview properties wins
/// (first match in configured order). Otherwise the body is stripped of
/// markdown syntax. Returns `""` when nothing readable remains.
pub fn extract_preview(content: &str, cache: Option<&FileCache>, options: &PreviewOptions) -> String {
    if let Some(text) = property_override(cache, &options.properties) {
        return finish(text);
    }
    finish(&strip_markdown(content, options))
}

fn property_override<'a>(cache: Option<&'a FileCache>, properties: &[String]) -> Option<&'a str> {
    let cache = cache?;
    properties.iter().find_map(|key| match cache.property(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        _ => None,
    })
}

fn finish(text: &str) -> String {
    let collapsed = WHITESPACE_REGEX.replace_all(text, " ");
    truncate_preview(collapsed.trim(), PREVIEW_MAX_CHARS)
}

/// Reduce markdown to plain text, one output line per kept input line.
pub(crate) fn strip_markdown(content: &str, options: &PreviewOptions) -> String {
    let body = FRONTMATTER_REGEX.replace(content, "");
    let body = COMMENT_REGEX.replace_all(&body, "");
    let mut kept: Vec<Cow<'_, str>> = Vec::new();
    let mut fence: Option<&str> = None;
    for line in body.lines() {
        if let Some(marker) = FENCE_REGEX.captures(line).and_then(|c| c.get(1)) {
            match fence {
                // Only the matching marker closes a block.
                Some(open) if open == marker.as_str() => fence = None,
                Some(_) => {},
                None => fence = Some(if marker.as_str() == "```" { "```" } else { "~~~" }),
            }
            continue;
        }
        if fence.is_some() {
            if !options.skip_code_blocks {
                kept.push(Cow::Borrowed(line));
            }
            continue;
        }
        if let Some(text) = block_line(line, options) {
            kept.push(text);
        }
    }
    let joined = kept.join("\n");
    strip_inline(&joined)
}

/// Handle one line outside of code fences; `None` drops it.
fn block_line<'a>(line: &'a str, options: &PreviewOptions) -> Option<Cow<'a, str>> {
    if line.trim().is_empty() || RULE_REGEX.is_match(line) || TABLE_SEPARATOR_REGEX.is_match(line) {
        return None;
    }
    if let Some(heading) = HEADING_REGEX.find(line) {
        if options.skip_headings {
            return None;
        }
        let text = HEADING_CLOSING_REGEX.replace(&line[heading.end()..], "");
        return Some(Cow::Owned(text.into_owned()));
    }
    let line = QUOTE_REGEX.replace(line, "");
    let line = strip_match(&CALLOUT_REGEX, line);
    let line = strip_match(&LIST_REGEX, line);
    let line = match line.contains('|') {
        true => Cow::Owned(line.replace('|', " ")),
        false => line,
    };
    Some(line)
}

fn strip_match<'a>(regex: &Regex, line: Cow<'a, str>) -> Cow<'a, str> {
    match regex.is_match(&line) {
        true => Cow::Owned(regex.replace(&line, "").into_owned()),
        false => line,
    }
}

fn strip_inline(text: &str) -> String {
    let text = EMBED_REGEX.replace_all(text, "");
    let text = IMAGE_REGEX.replace_all(&text, "");
    let text = WIKILINK_ALIAS_REGEX.replace_all(&text, "$1");
    let text = WIKILINK_REGEX.replace_all(&text, "$1");
    let text = LINK_REGEX.replace_all(&text, "$1");
    let text = FOOTNOTE_REGEX.replace_all(&text, "");
    let text = HTML_TAG_REGEX.replace_all(&text, "");
    let text = INLINE_CODE_REGEX.replace_all(&text, "$1");
    let text = BOLD_STAR_REGEX.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE_REGEX.replace_all(&text, "$1");
    let text = ITALIC_STAR_REGEX.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE_REGEX.replace_all(&text, "$1");
    let text = STRIKE_REGEX.replace_all(&text, "$1");
    let text = HIGHLIGHT_REGEX.replace_all(&text, "$1");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn options(skip_headings: bool, skip_code_blocks: bool) -> PreviewOptions {
        PreviewOptions { skip_headings, skip_code_blocks, properties: Vec::new() }
    }

    #[rstest]
    #[case("# Title\nBody text", false, "Title Body text")]
    #[case("# Title\nBody text", true, "Body text")]
    #[case("## Closed heading ##\ntext", false, "Closed heading text")]
    #[case("#tag at start of line", true, "#tag at start of line")]
    fn headings(#[case] content: &str, #[case] skip: bool, #[case] expected: &str) {
        assert_eq!(extract_preview(content, None, &options(skip, false)), expected);
    }

    #[rstest]
    #[case(true, "Before After")]
    #[case(false, "Before let x = 1; After")]
    fn code_blocks(#[case] skip: bool, #[case] expected: &str) {
        let content = "Before\n```rust\nlet x = 1;\n```\nAfter";
        assert_eq!(extract_preview(content, None, &options(false, skip)), expected);
    }

    #[test]
    fn unterminated_fence_swallows_rest() {
        let content = "Intro\n~~~\ncode\n```\nstill code";
        assert_eq!(extract_preview(content, None, &options(false, true)), "Intro");
    }

    #[test]
    fn frontmatter_is_removed() {
        let content = "---\ntitle: Hello\ntags: [a]\n---\nActual body";
        assert_eq!(extract_preview(content, None, &options(false, true)), "Actual body");
    }

    #[test]
    fn only_frontmatter_is_empty() {
        let content = "---\ntitle: Hello\n---\n";
        assert_eq!(extract_preview(content, None, &options(false, true)), "");
    }

    #[rstest]
    #[case("See [[Other Note]] and [[Other|alias]].", "See Other Note and alias.")]
    #[case("A [link](https://example.com) here", "A link here")]
    #[case("Embed ![[image.png]] gone ![alt](pic.jpg)", "Embed gone")]
    #[case("**bold** __also__ *it* _em_ ~~del~~ ==hl== `code`", "bold also it em del hl code")]
    #[case("Text with footnote[^1] and <span>html</span>", "Text with footnote and html")]
    #[case("Hidden %%comment%% and <!-- html comment -->", "Hidden and")]
    #[case("> [!note] Callout title\n> callout body", "Callout title callout body")]
    #[case("- item one\n- [x] done\n1. first", "item one done first")]
    #[case("| a | b |\n|---|---|\n| 1 | 2 |", "a b 1 2")]
    #[case("Above\n---\nBelow\n***", "Above Below")]
    #[case("[[Note#Section]]", "Note")]
    fn inline_and_block_syntax(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(extract_preview(content, None, &options(false, true)), expected);
    }

    #[test]
    fn property_override_wins() {
        let Value::Object(fm) = json!({"summary": "  From frontmatter  ", "empty": ""}) else {
            unreachable!()
        };
        let cache = FileCache::default().with_frontmatter(fm);
        let options = PreviewOptions {
            properties: vec!["missing".to_string(), "empty".to_string(), "summary".to_string()],
            ..PreviewOptions::default()
        };
        assert_eq!(extract_preview("# Body", Some(&cache), &options), "From frontmatter");
    }

    #[test]
    fn long_previews_are_truncated() {
        let content = "word ".repeat(200);
        let preview = extract_preview(&content, None, &PreviewOptions::default());
        assert!(preview.chars().count() <= PREVIEW_MAX_CHARS + 1);
        assert!(preview.ends_with('…'));
    }
}
