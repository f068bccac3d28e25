use crate::error::{Error, ErrorKind};
use crate::models::{ContentUpdate, FileRecord};
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;

fn to_json<T: Serialize>(value: &T, field: &'static str) -> Result<String, Error> {
    serde_json::to_string(value).or_raise(|| ErrorKind::InvalidData(field))
}

fn from_json<T: DeserializeOwned>(value: Option<&str>, field: &'static str) -> Result<Option<T>, Error> {
    value.map(|v| serde_json::from_str(v).or_raise(|| ErrorKind::InvalidData(field))).transpose()
}

#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub(crate) struct FileRow {
    pub path: String,
    pub mtime: i64,
    pub tags: Option<String>,
    pub preview: Option<String>,
    pub feature_image: Option<String>,
    pub metadata: Option<String>,
}

impl TryFrom<&ContentUpdate> for FileRow {
    type Error = Error;
    fn try_from(update: &ContentUpdate) -> Result<Self, Self::Error> {
        Ok(Self {
            path: update.path.clone(),
            mtime: 0,
            tags: update.tags.as_ref().map(|t| to_json(t, "tags")).transpose()?,
            preview: update.preview.clone(),
            feature_image: update.feature_image.clone(),
            metadata: update.metadata.as_ref().map(|m| to_json(m, "metadata")).transpose()?,
        })
    }
}

impl TryFrom<FileRow> for FileRecord {
    type Error = Error;
    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tags: from_json(row.tags.as_deref(), "tags")?,
            metadata: from_json(row.metadata.as_deref(), "metadata")?,
            path: row.path,
            mtime: row.mtime,
            preview: row.preview,
            feature_image: row.feature_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_extract::models::{FileMetadata, MetadataDate, SENTINEL_NOT_CONFIGURED};

    #[test]
    fn test_row_to_model() {
        let row = FileRow {
            path: "notes/a.md".to_string(),
            mtime: 100,
            tags: Some(r#"["work","project"]"#.to_string()),
            preview: Some(String::new()),
            feature_image: None,
            metadata: Some(format!(r#"{{"created":1,"modified":{SENTINEL_NOT_CONFIGURED}}}"#)),
        };
        let record = FileRecord::try_from(row).unwrap();
        assert_eq!(record.tags, Some(vec!["work".to_string(), "project".to_string()]));
        assert_eq!(record.preview.as_deref(), Some(""));
        assert_eq!(record.feature_image, None);
        let metadata = record.metadata.unwrap();
        assert_eq!(metadata.created, MetadataDate::Timestamp(1));
        assert_eq!(metadata.modified, MetadataDate::NotConfigured);
    }

    #[test]
    fn test_model_to_row() {
        let update = ContentUpdate {
            tags: Some(Vec::new()),
            metadata: Some(FileMetadata::default()),
            ..ContentUpdate::new("a.md")
        };
        let row = FileRow::try_from(&update).unwrap();
        assert_eq!(row.tags.as_deref(), Some("[]"));
        assert_eq!(row.preview, None);
        assert!(row.metadata.unwrap().contains(&SENTINEL_NOT_CONFIGURED.to_string()));
    }

    #[test]
    fn test_corrupt_json_is_invalid_data() {
        let row = FileRow { path: "a.md".to_string(), tags: Some("{not json".to_string()), ..FileRow::default() };
        let err = FileRecord::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("tags")));
    }
}
