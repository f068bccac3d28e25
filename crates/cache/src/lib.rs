//! SQLite keyed store for derived vault file content.
//!
//! One record per vault file, keyed by its vault-relative path, holding the
//! modification time the derived fields were computed against and one
//! nullable column per content kind. The store is a cache: the vault is the
//! source of truth, and deleting the database only costs a regeneration.
//!
//! Writers that change derived content announce it on a broadcast channel
//! ([`Repository::subscribe`]) so views can refresh. Bookkeeping writes such
//! as modification times are silent.

mod db;
pub mod error;
mod events;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::events::StoreEvent;
pub use crate::models::{ContentField, ContentUpdate, FileRecord, MtimeUpdate};
pub use crate::repo::{CLEAR_WINDOW, Repository, SyncReport};
