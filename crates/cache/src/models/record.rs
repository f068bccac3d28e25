use derive_more::Display;
use folio_extract::models::FileMetadata;
use serde::{Deserialize, Serialize};

/// The cached state of one vault file.
///
/// Every derived field distinguishes "not computed" (`None`) from an empty
/// result (`Some` of an empty value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    /// Modification time (epoch ms) the derived fields were computed against.
    pub mtime: i64,
    pub tags: Option<Vec<String>>,
    pub preview: Option<String>,
    /// Resolved vault path or external URL.
    pub feature_image: Option<String>,
    pub metadata: Option<FileMetadata>,
}

impl FileRecord {
    /// A record with nothing computed yet.
    pub fn new(path: impl Into<String>, mtime: i64) -> Self {
        Self { path: path.into(), mtime, tags: None, preview: None, feature_image: None, metadata: None }
    }

    pub fn has(&self, field: ContentField) -> bool {
        match field {
            ContentField::Tags => self.tags.is_some(),
            ContentField::Preview => self.preview.is_some(),
            ContentField::FeatureImage => self.feature_image.is_some(),
            ContentField::Metadata => self.metadata.is_some(),
        }
    }
}

/// One derived-content column of the store.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentField {
    #[display("tags")]
    Tags,
    #[display("preview")]
    Preview,
    #[display("feature image")]
    FeatureImage,
    #[display("metadata")]
    Metadata,
}

impl ContentField {
    pub const ALL: [ContentField; 4] = [Self::Tags, Self::Preview, Self::FeatureImage, Self::Metadata];

    /// Column name; only ever interpolated from this fixed set.
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::Tags => "tags",
            Self::Preview => "preview",
            Self::FeatureImage => "feature_image",
            Self::Metadata => "metadata",
        }
    }
}

/// A partial write of derived content. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentUpdate {
    pub path: String,
    pub tags: Option<Vec<String>>,
    pub preview: Option<String>,
    pub feature_image: Option<String>,
    pub metadata: Option<FileMetadata>,
}

impl ContentUpdate {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Self::default() }
    }

    /// `true` when nothing would be written.
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.preview.is_none() && self.feature_image.is_none() && self.metadata.is_none()
    }
}

/// Record that a file's derived fields are now current as of `mtime`.
///
/// Only the `fresh` fields were computed against `mtime`. When the stored
/// mtime differs, every other field is nulled so it can't pass as current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtimeUpdate {
    pub path: String,
    pub mtime: i64,
    pub fresh: Vec<ContentField>,
}

impl MtimeUpdate {
    pub fn new(path: impl Into<String>, mtime: i64, fresh: impl IntoIterator<Item = ContentField>) -> Self {
        Self { path: path.into(), mtime, fresh: fresh.into_iter().collect() }
    }

    pub(crate) fn is_fresh(&self, field: ContentField) -> bool {
        self.fresh.contains(&field)
    }
}
