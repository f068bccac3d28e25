//! Staleness evaluation and queued work items.

use folio_cache::{ContentField, FileRecord};
use folio_config::Settings;
use folio_vault::VaultFile;
use std::collections::VecDeque;

/// Which content kinds of a file need (re)generating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Needs {
    pub tags: bool,
    pub preview: bool,
    pub image: bool,
    pub metadata: bool,
}

impl Needs {
    /// Decide what is stale for `file`.
    ///
    /// A kind is needed when its setting is on, the file is eligible (tags,
    /// preview and metadata only apply to markdown; feature images to any
    /// file), and the stored value can't be trusted: there is no record, the
    /// field was never computed, or the file changed since the record was
    /// written.
    pub fn evaluate(file: &VaultFile, record: Option<&FileRecord>, settings: &Settings) -> Self {
        let stale = |field| record.is_none_or(|r| !r.has(field) || r.mtime != file.mtime);
        let markdown = file.is_markdown();
        Self {
            tags: settings.show_tags && markdown && stale(ContentField::Tags),
            preview: settings.show_file_preview && markdown && stale(ContentField::Preview),
            image: settings.show_feature_image && stale(ContentField::FeatureImage),
            metadata: settings.use_frontmatter_metadata && markdown && stale(ContentField::Metadata),
        }
    }

    pub fn any(&self) -> bool {
        self.tags || self.preview || self.image || self.metadata
    }

    /// The store fields these needs regenerate.
    pub fn fields(self) -> impl Iterator<Item = ContentField> {
        [
            (self.tags, ContentField::Tags),
            (self.preview, ContentField::Preview),
            (self.image, ContentField::FeatureImage),
            (self.metadata, ContentField::Metadata),
        ]
        .into_iter()
        .filter_map(|(needed, field)| needed.then_some(field))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            tags: self.tags || other.tags,
            preview: self.preview || other.preview,
            image: self.image || other.image,
            metadata: self.metadata || other.metadata,
        }
    }
}

/// One file waiting for content generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentJob {
    pub file: VaultFile,
    pub needs: Needs,
}

impl ContentJob {
    /// Fold another job for the same path into this one: needs are combined
    /// and the newer file handle is kept.
    fn absorb(&mut self, other: ContentJob) {
        self.needs = self.needs.union(other.needs);
        if other.file.mtime >= self.file.mtime {
            self.file = other.file;
        }
    }
}

/// Append jobs, merging those whose path is already queued. Returns the
/// number of new queue entries.
pub(crate) fn enqueue(queue: &mut VecDeque<ContentJob>, jobs: Vec<ContentJob>) -> usize {
    let mut added = 0;
    for job in jobs {
        match queue.iter_mut().find(|queued| queued.file.path == job.file.path) {
            Some(queued) => queued.absorb(job),
            None => {
                queue.push_back(job);
                added += 1;
            },
        }
    }
    added
}

/// Put unprocessed jobs back at the front, in their original order.
///
/// A job queued for the same path in the meantime is folded into the
/// returning one.
pub(crate) fn requeue_front(queue: &mut VecDeque<ContentJob>, jobs: Vec<ContentJob>) {
    for mut job in jobs.into_iter().rev() {
        if let Some(position) = queue.iter().position(|queued| queued.file.path == job.file.path)
            && let Some(newer) = queue.remove(position)
        {
            job.absorb(newer);
        }
        queue.push_front(job);
    }
}
