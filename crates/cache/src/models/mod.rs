mod file;
mod record;

pub(crate) use self::file::FileRow;
pub use self::record::{ContentField, ContentUpdate, FileRecord, MtimeUpdate};
