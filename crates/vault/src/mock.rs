//! In-memory vault for testing.

use crate::error::{ErrorKind, Result};
use crate::file::{FileCache, VaultFile};
use crate::{Vault, path};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

struct Entry {
    file: VaultFile,
    content: String,
    cache: Option<FileCache>,
}

/// In-memory vault for testing.
///
/// Files live in a `BTreeMap` behind a [`RwLock`], so every method works on
/// `&self`. Markdown files get an empty [`FileCache`] by default (as if the
/// host had indexed them); other files have none unless one is set.
///
/// # Examples
///
/// ```
/// use folio_vault::{MockVault, Vault};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let vault = MockVault::default()
///     .with_file("notes/a.md", 100, "# Hello")
///     .with_file("img/cover.png", 100, "");
/// let files = vault.list_files().await.unwrap();
/// assert_eq!(files.len(), 2);
/// assert_eq!(vault.read(&files[1]).await.unwrap(), "# Hello");
/// # }
/// ```
#[derive(Default)]
pub struct MockVault {
    entries: RwLock<BTreeMap<String, Entry>>,
    unreadable: RwLock<HashSet<String>>,
    read_delay: Option<Duration>,
    reads: AtomicUsize,
}

impl MockVault {
    /// Add (or replace) a file.
    ///
    /// Panics if the path fails validation. If test setup is wrong, then
    /// the test should not pass.
    pub fn with_file(self, path: impl AsRef<str>, mtime: i64, content: impl Into<String>) -> Self {
        self.insert(path, mtime, content);
        self
    }

    /// Replace the cached metadata of an existing file.
    pub fn with_cache(self, path: impl AsRef<str>, cache: FileCache) -> Self {
        self.set_cache(path, Some(cache));
        self
    }

    /// Make every `read()` sleep first, to keep reads in flight.
    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn insert(&self, path: impl AsRef<str>, mtime: i64, content: impl Into<String>) -> VaultFile {
        let Ok(path) = path::normalize(path.as_ref()) else {
            // The panic here is DELIBERATE. MockVault is intended to be
            // used in tests; panics are expected. There is no error result.
            panic!("MockVault::insert: invalid path {}", path.as_ref());
        };
        let file = VaultFile::new(path.clone(), mtime);
        let cache = file.is_markdown().then(FileCache::default);
        let entry = Entry { file: file.clone(), content: content.into(), cache };
        self.entries.write().unwrap_or_else(PoisonError::into_inner).insert(path, entry);
        file
    }

    pub fn set_cache(&self, path: impl AsRef<str>, cache: Option<FileCache>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get_mut(path.as_ref()) {
            Some(entry) => entry.cache = cache,
            None => panic!("MockVault::set_cache: no such file {}", path.as_ref()),
        }
    }

    /// Simulate an edit: bump the mtime (and optionally replace the content).
    pub fn touch(&self, path: impl AsRef<str>, mtime: i64, content: Option<String>) -> VaultFile {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get_mut(path.as_ref()) else {
            panic!("MockVault::touch: no such file {}", path.as_ref());
        };
        entry.file.mtime = mtime;
        if let Some(content) = content {
            entry.content = content;
        }
        entry.file.clone()
    }

    pub fn remove(&self, path: impl AsRef<str>) -> Option<VaultFile> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).remove(path.as_ref()).map(|e| e.file)
    }

    /// Make reads of `path` fail with [`ErrorKind::Unreadable`].
    pub fn set_unreadable(&self, path: impl Into<String>) {
        self.unreadable.write().unwrap_or_else(PoisonError::into_inner).insert(path.into());
    }

    pub fn get(&self, path: impl AsRef<str>) -> Option<VaultFile> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(path.as_ref()).map(|e| e.file.clone())
    }

    /// Number of `read()` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn find_by_name(&self, name: &str) -> Option<VaultFile> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        // Shortest path wins, like the host's "shortest unique path" links.
        entries
            .values()
            .filter(|e| path::file_name(&e.file.path) == name || e.file.basename() == name)
            .min_by_key(|e| e.file.path.len())
            .map(|e| e.file.clone())
    }
}

#[async_trait]
impl Vault for MockVault {
    async fn list_files(&self) -> Result<Vec<VaultFile>> {
        Ok(self.entries.read().unwrap_or_else(PoisonError::into_inner).values().map(|e| e.file.clone()).collect())
    }

    fn file_cache(&self, file: &VaultFile) -> Option<FileCache> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).get(&file.path).and_then(|e| e.cache.clone())
    }

    async fn read(&self, file: &VaultFile) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreadable.read().unwrap_or_else(PoisonError::into_inner).contains(&file.path) {
            exn::bail!(ErrorKind::Unreadable(file.path.clone()));
        }
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&file.path).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(file.path.clone())))?;
        Ok(entry.content.clone())
    }

    fn resolve_link(&self, link: &str, source_path: &str) -> Option<VaultFile> {
        let link = link.split('#').next().unwrap_or(link).trim();
        if link.is_empty() {
            return None;
        }
        let relative = match path::parent(source_path) {
            "" => link.to_string(),
            dir => format!("{dir}/{link}"),
        };
        for candidate in [link.to_string(), relative] {
            let Ok(candidate) = path::normalize(&candidate) else {
                continue;
            };
            if let Some(file) = self.get(&candidate).or_else(|| self.get(format!("{candidate}.md"))) {
                return Some(file);
            }
        }
        self.find_by_name(path::file_name(link))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn markdown_files_have_a_cache() {
        let vault = MockVault::default().with_file("a.md", 1, "").with_file("b.png", 1, "");
        let md = vault.get("a.md").unwrap();
        let png = vault.get("b.png").unwrap();
        assert_eq!(vault.file_cache(&md), Some(FileCache::default()));
        assert_eq!(vault.file_cache(&png), None);
    }

    #[tokio::test]
    async fn read_counts_and_fails_on_demand() {
        let vault = MockVault::default().with_file("a.md", 1, "text");
        let file = vault.get("a.md").unwrap();
        assert_eq!(vault.read(&file).await.unwrap(), "text");
        vault.set_unreadable("a.md");
        let err = vault.read(&file).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Unreadable(_)));
        assert_eq!(vault.read_count(), 2);
    }

    #[tokio::test]
    async fn read_missing_file() {
        let vault = MockVault::default();
        let err = vault.read(&VaultFile::new("gone.md", 1)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn touch_updates_mtime_and_content() {
        let vault = MockVault::default().with_file("a.md", 1, "old");
        let file = vault.touch("a.md", 2, Some("new".to_string()));
        assert_eq!(file.mtime, 2);
        assert_eq!(vault.get("a.md").unwrap().mtime, 2);
    }

    #[test]
    fn resolves_links() {
        let vault = MockVault::default()
            .with_file("notes/daily/today.md", 1, "")
            .with_file("notes/daily/pic.png", 1, "")
            .with_file("assets/cover.jpg", 1, "")
            .with_file("deep/nested/cover.jpg", 1, "");
        let source = "notes/daily/today.md";
        assert_eq!(vault.resolve_link("pic.png", source).unwrap().path, "notes/daily/pic.png");
        assert_eq!(vault.resolve_link("assets/cover.jpg", source).unwrap().path, "assets/cover.jpg");
        assert_eq!(vault.resolve_link("cover.jpg", source).unwrap().path, "assets/cover.jpg");
        assert_eq!(vault.resolve_link("today#Heading", "elsewhere.md").unwrap().path, source);
        assert!(vault.resolve_link("missing.png", source).is_none());
        assert!(vault.resolve_link("#only-heading", source).is_none());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn insert_panics_on_bad_path() {
        MockVault::default().with_file("../escape.md", 1, "");
    }
}
