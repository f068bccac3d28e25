//! Utilities for truncating preview text for display.

use memchr::memrchr;

pub const PREVIEW_MAX_CHARS: usize = 300;
const ELLIPSIS: char = '…';

/// Truncates `text` to at most `max_chars` characters (plus an ellipsis),
/// preferring to cut at the last space so words are not split.
///
/// Cuts are always made on a char boundary. If the only space in the kept
/// prefix is in its first half, the prefix is cut hard instead, so one long
/// word doesn't reduce the preview to almost nothing.
///
/// # Examples
///
/// ```rust
/// use folio_extract::truncate_preview;
/// assert_eq!(truncate_preview("short", 10), "short");
/// assert_eq!(truncate_preview("hello brave new world", 13), "hello brave…");
/// assert_eq!(truncate_preview("ünïcödé", 3), "ünï…");
/// ```
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let candidate = &text[..cut];
    // Spaces are ASCII, so any byte match is also a char boundary.
    let kept = match memrchr(b' ', candidate.as_bytes()) {
        Some(space) if space >= candidate.len() / 2 => &candidate[..space],
        _ => candidate,
    };
    let mut out = String::with_capacity(kept.len() + ELLIPSIS.len_utf8());
    out.push_str(kept.trim_end());
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_truncation_needed() {
        assert_eq!(truncate_preview("Title Body text", PREVIEW_MAX_CHARS), "Title Body text");
    }

    #[test]
    fn exact_length_is_untouched() {
        assert_eq!(truncate_preview("abcde", 5), "abcde");
    }

    #[test]
    fn cuts_at_word_boundary() {
        assert_eq!(truncate_preview("one two three four", 12), "one two…");
    }

    #[test]
    fn hard_cut_for_long_words() {
        assert_eq!(truncate_preview("a supercalifragilistic", 10), "a supercal…");
    }

    #[test]
    fn multibyte_safe() {
        let text = "日本語のテキストです";
        assert_eq!(truncate_preview(text, 4), "日本語の…");
    }

    #[test]
    fn empty() {
        assert_eq!(truncate_preview("", 0), "");
    }
}
