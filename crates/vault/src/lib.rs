//! Narrow adapter over the host application's vault.
//!
//! The content engine only needs four things from the host: the file
//! listing, the cached metadata of a file, the text of a file, and link
//! resolution. [`Vault`] is exactly that contract and nothing more, so the
//! assumptions about host internals live in one place.

pub mod error;
mod file;
#[cfg(feature = "mock")]
mod mock;
pub mod path;

pub use crate::file::{Embed, FileCache, Frontmatter, VaultFile, is_image_extension};
#[cfg(feature = "mock")]
pub use crate::mock::MockVault;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub type VaultHandle = Arc<dyn Vault>;

/// The host collaborator, as seen by the content engine.
///
/// # Examples
///
/// ```
/// use folio_vault::{Vault, VaultFile, error::Result};
///
/// async fn markdown_files(vault: &dyn Vault) -> Result<Vec<VaultFile>> {
///     let files = vault.list_files().await?;
///     Ok(files.into_iter().filter(VaultFile::is_markdown).collect())
/// }
/// ```
#[async_trait]
pub trait Vault: Send + Sync {
    /// Every file currently in the vault, in no particular order.
    async fn list_files(&self) -> Result<Vec<VaultFile>>;

    /// The host's cached metadata for `file`.
    ///
    /// Synchronous and cheap. Returns `None` when the host has not indexed
    /// the file yet (or never will, e.g. binary files).
    fn file_cache(&self, file: &VaultFile) -> Option<FileCache>;

    /// Read the full text content of `file`.
    async fn read(&self, file: &VaultFile) -> Result<String>;

    /// Resolve a link target (wikilink text or relative path, without
    /// brackets, aliases or heading fragments) as seen from `source_path`.
    fn resolve_link(&self, link: &str, source_path: &str) -> Option<VaultFile>;
}
