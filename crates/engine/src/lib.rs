//! Incremental content indexing for a note vault.
//!
//! [`ContentService`] decides which files have stale derived content (tags,
//! preview text, feature image, frontmatter metadata), queues regeneration
//! work and writes results back to the [`folio_cache`] store in batches.
//!
//! # Example
//!
//! ```no_run
//! use folio_cache::Repository;
//! use folio_config::Config;
//! use folio_engine::ContentService;
//! use folio_vault::VaultHandle;
//!
//! async fn index(vault: VaultHandle, repo: Repository, config: Config) -> folio_engine::error::Result<usize> {
//!     let service = ContentService::new(vault.clone(), repo, config.limits);
//!     let files = vault.list_files().await.unwrap_or_default();
//!     service.queue_content(files, config.settings).await
//! }
//! ```

pub mod error;
mod job;
mod process;
mod service;
mod status;

pub use crate::job::{ContentJob, Needs};
pub use crate::service::{ContentService, SettingsImpact};
pub use crate::status::Status;
