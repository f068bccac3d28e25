//! File handles and cached metadata as reported by the host.

use crate::path;
use serde::{Deserialize, Serialize};

/// Parsed YAML frontmatter, as the host's metadata cache exposes it.
pub type Frontmatter = serde_json::Map<String, serde_json::Value>;

const MARKDOWN_EXTENSION: &str = "md";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "avif"];

/// A file handle from the host's file listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultFile {
    /// Vault-relative path; the unique key of the file.
    pub path: String,
    /// Extension without the dot, as reported by the host.
    pub extension: String,
    /// Last modification time in epoch milliseconds.
    pub mtime: i64,
}

impl VaultFile {
    /// Build a handle from a path, deriving the extension from it.
    pub fn new(path: impl Into<String>, mtime: i64) -> Self {
        let path = path.into();
        let extension = path::extension(&path).to_string();
        Self { path, extension, mtime }
    }

    pub fn is_markdown(&self) -> bool {
        self.extension.eq_ignore_ascii_case(MARKDOWN_EXTENSION)
    }

    pub fn is_image(&self) -> bool {
        is_image_extension(&self.extension)
    }

    /// File name without its extension.
    pub fn basename(&self) -> &str {
        let name = path::file_name(&self.path);
        match self.extension.is_empty() {
            true => name,
            false => name.strip_suffix(&self.extension).and_then(|n| n.strip_suffix('.')).unwrap_or(name),
        }
    }
}

pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| ext.eq_ignore_ascii_case(extension))
}

/// An `![[embed]]` (or `![](embed)`) found by the host while indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Link text as written, without the surrounding brackets.
    pub link: String,
}
impl From<&str> for Embed {
    fn from(link: &str) -> Self {
        Self { link: link.to_string() }
    }
}

/// What the host's metadata cache knows about one file.
///
/// Cheap to obtain (no file read); may be unavailable until the host has
/// finished its own indexing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileCache {
    #[serde(default)]
    pub frontmatter: Option<Frontmatter>,
    /// Embeds in document order.
    #[serde(default)]
    pub embeds: Vec<Embed>,
    /// Inline `#tags` in document order, as written (with the `#`).
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FileCache {
    pub fn with_frontmatter(mut self, frontmatter: Frontmatter) -> Self {
        self.frontmatter = Some(frontmatter);
        self
    }

    pub fn with_embeds<I, E>(mut self, embeds: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Embed>,
    {
        self.embeds = embeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a frontmatter value by key.
    pub fn property(&self, key: &str) -> Option<&serde_json::Value> {
        self.frontmatter.as_ref().and_then(|fm| fm.get(key))
    }
}
