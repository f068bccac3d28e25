mod metadata;

pub use self::metadata::{FileMetadata, MetadataDate, SENTINEL_NOT_CONFIGURED, SENTINEL_PARSE_FAILED};
