//! Per-job extraction and the minimal store delta.

use crate::error::{ErrorKind, Result};
use crate::job::ContentJob;
use exn::ResultExt;
use folio_cache::{ContentUpdate, FileRecord};
use folio_extract::Extractor;
use folio_extract::models::FileMetadata;
use folio_vault::Vault;

/// Freshly extracted content; `None` for kinds the job did not need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Extracted {
    pub tags: Option<Vec<String>>,
    pub preview: Option<String>,
    pub feature_image: Option<String>,
    pub metadata: Option<FileMetadata>,
}

/// Extract every needed kind for one file.
///
/// The cached metadata is fetched once and shared by all kinds. The file is
/// only read when a preview is needed. A markdown file the host hasn't
/// indexed yet fails with [`ErrorKind::NotIndexed`], so it stays stale.
pub(crate) async fn process_job(vault: &dyn Vault, extractor: &Extractor, job: &ContentJob) -> Result<Extracted> {
    let file = &job.file;
    let cache = vault.file_cache(file);
    if cache.is_none() && file.is_markdown() {
        exn::bail!(ErrorKind::NotIndexed(file.path.clone()));
    }
    let content = match job.needs.preview && file.is_markdown() {
        true => Some(vault.read(file).await.or_raise(|| ErrorKind::Read(file.path.clone()))?),
        false => None,
    };
    Ok(Extracted {
        tags: job.needs.tags.then(|| extractor.tags(cache.as_ref())),
        preview: content.map(|content| extractor.preview(&content, cache.as_ref())),
        feature_image: job.needs.image.then(|| extractor.feature_image(file, cache.as_ref(), vault)),
        metadata: job.needs.metadata.then(|| extractor.metadata(cache.as_ref())),
    })
}

impl Extracted {
    /// Reduce to the fields that differ from what is stored.
    pub(crate) fn into_update(self, path: &str, existing: Option<&FileRecord>) -> ContentUpdate {
        let update = ContentUpdate::new(path);
        let Some(existing) = existing else {
            return ContentUpdate {
                tags: self.tags,
                preview: self.preview,
                feature_image: self.feature_image,
                metadata: self.metadata,
                ..update
            };
        };
        ContentUpdate {
            tags: self.tags.filter(|v| existing.tags.as_ref() != Some(v)),
            preview: self.preview.filter(|v| existing.preview.as_ref() != Some(v)),
            feature_image: self.feature_image.filter(|v| existing.feature_image.as_ref() != Some(v)),
            metadata: self.metadata.filter(|v| existing.metadata.as_ref() != Some(v)),
            ..update
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::Needs;
    use folio_config::Settings;
    use folio_extract::models::MetadataDate;
    use folio_vault::{FileCache, MockVault};
    use serde_json::json;

    fn job(vault: &MockVault, path: &str, needs: Needs) -> ContentJob {
        ContentJob { file: vault.get(path).unwrap(), needs }
    }

    #[tokio::test]
    async fn reads_only_for_previews() {
        let vault = MockVault::default().with_file("note.md", 100, "# Title\nBody text");
        let extractor = Extractor::new(&Settings::default());
        let tags_only = Needs { tags: true, ..Needs::default() };
        let extracted = process_job(&vault, &extractor, &job(&vault, "note.md", tags_only)).await.unwrap();
        assert_eq!(vault.read_count(), 0);
        assert_eq!(extracted, Extracted { tags: Some(Vec::new()), ..Extracted::default() });

        let preview = Needs { preview: true, ..Needs::default() };
        let extracted = process_job(&vault, &extractor, &job(&vault, "note.md", preview)).await.unwrap();
        assert_eq!(vault.read_count(), 1);
        assert_eq!(extracted.preview.as_deref(), Some("Title Body text"));
    }

    #[tokio::test]
    async fn all_kinds_from_one_cache_lookup() {
        let Some(frontmatter) = json!({"tags": ["x"], "feature": "[[cover.png]]", "created": "2024-01-15"})
            .as_object()
            .cloned()
        else {
            unreachable!()
        };
        let vault = MockVault::default()
            .with_file("note.md", 100, "body")
            .with_file("cover.png", 1, "")
            .with_cache("note.md", FileCache::default().with_frontmatter(frontmatter));
        let settings = Settings { use_frontmatter_metadata: true, ..Settings::default() };
        let extractor = Extractor::new(&settings);
        let all = Needs { tags: true, preview: true, image: true, metadata: true };
        let extracted = process_job(&vault, &extractor, &job(&vault, "note.md", all)).await.unwrap();
        assert_eq!(extracted.tags, Some(vec!["x".to_string()]));
        assert_eq!(extracted.preview.as_deref(), Some("body"));
        assert_eq!(extracted.feature_image.as_deref(), Some("cover.png"));
        let metadata = extracted.metadata.unwrap();
        assert_eq!(metadata.created, MetadataDate::Timestamp(1_705_276_800_000));
        assert_eq!(metadata.modified, MetadataDate::ParseFailed);
    }

    #[tokio::test]
    async fn unreadable_file_fails_the_job() {
        let vault = MockVault::default().with_file("note.md", 100, "text");
        vault.set_unreadable("note.md");
        let extractor = Extractor::new(&Settings::default());
        let preview = Needs { preview: true, ..Needs::default() };
        let err = process_job(&vault, &extractor, &job(&vault, "note.md", preview)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Read(path) if path == "note.md"));
    }

    #[tokio::test]
    async fn unindexed_markdown_fails_the_job() {
        let vault = MockVault::default().with_file("note.md", 100, "text").with_file("cover.png", 1, "");
        vault.set_cache("note.md", None);
        let extractor = Extractor::new(&Settings::default());
        let all = Needs { tags: true, preview: true, image: true, metadata: true };
        let err = process_job(&vault, &extractor, &job(&vault, "note.md", all)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotIndexed(path) if path == "note.md"));
        assert_eq!(vault.read_count(), 0);

        // Images never have cached metadata.
        let image = Needs { image: true, ..Needs::default() };
        let extracted = process_job(&vault, &extractor, &job(&vault, "cover.png", image)).await.unwrap();
        assert_eq!(extracted.feature_image.as_deref(), Some(""));
    }

    #[test]
    fn delta_omits_unchanged_fields() {
        let existing = FileRecord {
            tags: Some(vec!["a".to_string()]),
            preview: Some("old".to_string()),
            ..FileRecord::new("a.md", 1)
        };
        let extracted = Extracted {
            tags: Some(vec!["a".to_string()]),
            preview: Some("new".to_string()),
            feature_image: Some(String::new()),
            metadata: None,
        };
        let update = extracted.into_update("a.md", Some(&existing));
        assert_eq!(update, ContentUpdate {
            preview: Some("new".to_string()),
            feature_image: Some(String::new()),
            ..ContentUpdate::new("a.md")
        });
    }

    #[test]
    fn delta_without_record_keeps_everything() {
        let extracted = Extracted { tags: Some(Vec::new()), ..Extracted::default() };
        let update = extracted.into_update("a.md", None);
        assert_eq!(update.tags, Some(Vec::new()));
        assert!(!update.is_empty());
    }
}
