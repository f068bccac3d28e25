use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Block-level
regex!(FRONTMATTER_REGEX, r"\A---[ \t]*\r?\n(?s:.*?)\r?\n(?:---|\.\.\.)[ \t]*(?:\r?\n|\z)");
regex!(COMMENT_REGEX, r"(?s)%%.*?%%|<!--.*?-->");
regex!(FENCE_REGEX, r"^\s*(```|~~~)");
regex!(HEADING_REGEX, r"^\s{0,3}#{1,6}(?:\s+|$)");
regex!(HEADING_CLOSING_REGEX, r"\s+#+\s*$");
regex!(RULE_REGEX, r"^\s{0,3}(?:(?:\*\s*){3,}|(?:-\s*){3,}|(?:_\s*){3,})$");
regex!(TABLE_SEPARATOR_REGEX, r"^\s*\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)*\|?\s*$");
regex!(QUOTE_REGEX, r"^\s*(?:>\s?)+");
regex!(CALLOUT_REGEX, r"^\[![\w-]+\][+-]?\s*");
regex!(LIST_REGEX, r"^\s*(?:[-*+]|\d+[.)])\s+(?:\[[ xX]\]\s+)?");

// Inline
regex!(EMBED_REGEX, r"!\[\[[^\]]*\]\]");
regex!(IMAGE_REGEX, r"!\[[^\]]*\]\([^)]*\)");
regex!(WIKILINK_ALIAS_REGEX, r"\[\[[^\]|]*\|([^\]]*)\]\]");
regex!(WIKILINK_REGEX, r"\[\[([^\]#|]*)(?:#[^\]]*)?\]\]");
regex!(LINK_REGEX, r"\[([^\]]*)\]\([^)]*\)");
regex!(FOOTNOTE_REGEX, r"\[\^[^\]]+\]");
regex!(HTML_TAG_REGEX, r"</?[A-Za-z][^>]*>");
regex!(INLINE_CODE_REGEX, r"`([^`]*)`");
regex!(BOLD_STAR_REGEX, r"\*\*(.+?)\*\*");
regex!(BOLD_UNDERSCORE_REGEX, r"__(.+?)__");
regex!(ITALIC_STAR_REGEX, r"\*([^*\s](?:[^*]*[^*\s])?)\*");
regex!(ITALIC_UNDERSCORE_REGEX, r"\b_([^_]+)_\b");
regex!(STRIKE_REGEX, r"~~(.+?)~~");
regex!(HIGHLIGHT_REGEX, r"==(.+?)==");
regex!(WHITESPACE_REGEX, r"\s+");

// Links inside frontmatter values
regex!(MARKDOWN_TARGET_REGEX, r"^!?\[[^\]]*\]\(\s*<?([^)>]*)>?\s*\)$");
regex!(WIKILINK_TARGET_REGEX, r"^!?\[\[([^\]]*)\]\]$");
