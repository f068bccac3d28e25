use crate::dates::DateParser;
use crate::image::extract_feature_image;
use crate::metadata::{MetadataFields, extract_metadata};
use crate::models::FileMetadata;
use crate::preview::{PreviewOptions, extract_preview};
use crate::tags::extract_tags;
use folio_config::Settings;
use folio_vault::{FileCache, Vault, VaultFile};

/// Every extraction input derived from one [`Settings`] snapshot.
///
/// Built once per processing run so the date format is compiled once, not
/// per file.
#[derive(Debug, Clone)]
pub struct Extractor {
    preview: PreviewOptions,
    image_properties: Vec<String>,
    metadata: MetadataFields,
}

impl Extractor {
    pub fn new(settings: &Settings) -> Self {
        let dates = match DateParser::new(&settings.frontmatter_date_format) {
            Ok(parser) => Some(parser),
            Err(err) => {
                tracing::warn!(format = %settings.frontmatter_date_format, error = ?err, "invalid frontmatter date format");
                None
            },
        };
        Self {
            preview: PreviewOptions {
                skip_headings: settings.skip_headings_in_preview,
                skip_code_blocks: settings.skip_code_blocks_in_preview,
                properties: settings.preview_properties.clone(),
            },
            image_properties: settings.feature_image_properties.clone(),
            metadata: MetadataFields {
                name: settings.frontmatter_name_field.clone(),
                created: settings.frontmatter_created_field.clone(),
                modified: settings.frontmatter_modified_field.clone(),
                dates,
            },
        }
    }

    pub fn tags(&self, cache: Option<&FileCache>) -> Vec<String> {
        extract_tags(cache)
    }

    pub fn preview(&self, content: &str, cache: Option<&FileCache>) -> String {
        extract_preview(content, cache, &self.preview)
    }

    pub fn feature_image(&self, file: &VaultFile, cache: Option<&FileCache>, vault: &dyn Vault) -> String {
        extract_feature_image(file, cache, &self.image_properties, vault)
    }

    pub fn metadata(&self, cache: Option<&FileCache>) -> FileMetadata {
        extract_metadata(cache, &self.metadata)
    }
}
