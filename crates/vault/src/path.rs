//! Vault path helpers.
//!
//! Vault paths are `/`-separated strings relative to the vault root, exactly
//! as the host reports them. These helpers never touch the filesystem.

use crate::error::{ErrorKind, Result};

/// Normalizes a vault path and ensures it never leaves the vault root.
///
/// Empty segments and `.` are dropped, `..` pops the previous segment.
/// Null bytes are rejected.
///
/// # Examples
///
/// ```
/// use folio_vault::path::normalize;
/// assert_eq!(normalize("notes//./daily/../today.md").unwrap(), "notes/today.md");
/// assert!(normalize("../outside.md").is_err());
/// assert!(normalize("a\0b").is_err());
/// ```
pub fn normalize(path: impl AsRef<str>) -> Result<String> {
    let raw = path.as_ref();
    if raw.contains('\0') {
        exn::bail!(ErrorKind::InvalidPath(raw.to_string()));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(raw.to_string()));
                }
            },
            s => segments.push(s),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(raw.to_string())),
        false => Ok(segments.join("/")),
    }
}

/// The folder containing `path`, or `""` for files at the vault root.
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// The final path segment.
pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// The extension of the final segment without the dot, or `""`.
///
/// Dotfiles such as `.hidden` have no extension.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("notes/today.md", "notes/today.md")]
    #[case("a//b//c.md", "a/b/c.md")]
    #[case("a/./b/./c.md", "a/b/c.md")]
    #[case("a/b/..", "a")]
    #[case("/leading.md", "leading.md")]
    #[case("folder///", "folder")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).unwrap(), expected);
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("..")]
    #[case("")]
    #[case(".")]
    #[case("//")]
    #[case("a\0b")]
    fn rejects(#[case] input: &str) {
        let err = normalize(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("notes/today.md", "notes", "today.md", "md")]
    #[case("today.md", "", "today.md", "md")]
    #[case("a/b/archive.tar.gz", "a/b", "archive.tar.gz", "gz")]
    #[case("a/.hidden", "a", ".hidden", "")]
    #[case("a/README", "a", "README", "")]
    fn splits(#[case] path: &str, #[case] dir: &str, #[case] name: &str, #[case] ext: &str) {
        assert_eq!(parent(path), dir);
        assert_eq!(file_name(path), name);
        assert_eq!(extension(path), ext);
    }
}
