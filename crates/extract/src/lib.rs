//! Derived content for vault files.
//!
//! Each adapter turns what the host knows about a file (its cached metadata
//! and, for previews, its text) into one cached content kind. None of them
//! fail: missing or malformed inputs produce empty values or sentinels.
//! [`Extractor`] bundles them for one settings snapshot.

mod consts;
mod dates;
pub mod error;
mod extractor;
mod image;
mod metadata;
pub mod models;
mod preview;
mod tags;
mod truncate;

pub use crate::dates::DateParser;
pub use crate::extractor::Extractor;
pub use crate::image::extract_feature_image;
pub use crate::metadata::{MetadataFields, extract_metadata};
pub use crate::preview::{PreviewOptions, extract_preview};
pub use crate::tags::extract_tags;
pub use crate::truncate::{PREVIEW_MAX_CHARS, truncate_preview};
