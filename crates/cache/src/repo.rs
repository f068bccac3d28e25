//! Path-keyed access to file records.

use crate::error::{ErrorKind, Result};
use crate::models::{ContentField, ContentUpdate, FileRecord, FileRow, MtimeUpdate};
use crate::{Database, StoreEvent};
use exn::ResultExt;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast;
use tracing::instrument;

/// Rows touched per statement when clearing a field across the store.
pub const CLEAR_WINDOW: usize = 500;
// Well below SQLite's bound parameter limit.
const MAX_IN_PARAMS: usize = 500;

/// Outcome of [`Repository::sync_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records created for newly observed files.
    pub added: u64,
    /// Paths whose records were deleted because the file is gone.
    pub removed: Vec<String>,
}

/// Repository for file records in the content store.
///
/// Cheap to clone; every clone shares the pool and the notification channel
/// of the [`Database`] it was created from.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    events: broadcast::Sender<StoreEvent>,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), events: db.events().clone() }
    }
}
impl Repository {
    /// Receive a [`StoreEvent`] for every notifying write from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // No subscribers is fine.
        _ = self.events.send(event);
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    pub async fn get_file(&self, path: impl AsRef<str>) -> Result<Option<FileRecord>> {
        let row: Option<FileRow> = sqlx::query_as(include_str!("../queries/get_file.sql"))
            .bind(path.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(FileRecord::try_from).transpose()
    }

    /// Batch read of the records for exactly these paths, keyed by path.
    ///
    /// Paths without a record are simply absent from the map.
    #[instrument(skip_all, fields(paths = paths.len()))]
    pub async fn get_files(&self, paths: &[String]) -> Result<HashMap<String, FileRecord>> {
        let mut records = HashMap::with_capacity(paths.len());
        for chunk in paths.chunks(MAX_IN_PARAMS) {
            let mut query = QueryBuilder::<Sqlite>::new(
                "SELECT path, mtime, tags, preview, feature_image, metadata FROM files WHERE path IN (",
            );
            let mut separated = query.separated(", ");
            for path in chunk {
                separated.push_bind(path);
            }
            separated.push_unseparated(")");
            let rows: Vec<FileRow> =
                query.build_query_as().fetch_all(&self.pool).await.or_raise(|| ErrorKind::Database)?;
            for row in rows {
                let record = FileRecord::try_from(row)?;
                records.insert(record.path.clone(), record);
            }
        }
        Ok(records)
    }

    pub async fn get_all_files(&self) -> Result<Vec<FileRecord>> {
        let rows: Vec<FileRow> = sqlx::query_as(include_str!("../queries/get_all_files.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(FileRecord::try_from).collect()
    }

    pub async fn count_files(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_files.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    // =========================================================================
    // Content writes
    // =========================================================================

    /// Write derived content for many files in one transaction.
    ///
    /// Only the fields present in each update are written; records that do
    /// not exist yet are created (with an mtime of 0, so they stay stale
    /// until [`update_mtimes`](Self::update_mtimes) confirms them). Emits
    /// exactly one [`StoreEvent::Updated`] for the whole batch.
    #[instrument(skip_all, fields(updates = updates.len()))]
    pub async fn batch_update_file_content(&self, updates: &[ContentUpdate]) -> Result<()> {
        let updates: Vec<&ContentUpdate> = updates.iter().filter(|u| !u.is_empty()).collect();
        if updates.is_empty() {
            return Ok(());
        }
        let rows = updates.iter().map(|u| FileRow::try_from(*u)).collect::<Result<Vec<_>>>()?;
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for row in &rows {
            sqlx::query(include_str!("../queries/upsert_content.sql"))
                .bind(&row.path)
                .bind(&row.tags)
                .bind(&row.preview)
                .bind(&row.feature_image)
                .bind(&row.metadata)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        self.notify(StoreEvent::Updated(rows.into_iter().map(|r| r.path).collect()));
        Ok(())
    }

    /// Record the modification times derived content is now current for.
    ///
    /// A record whose mtime moves loses every field not listed as fresh.
    /// Silent: no notification, since nothing a view displays has changed.
    #[instrument(skip_all, fields(updates = updates.len()))]
    pub async fn update_mtimes(&self, updates: &[MtimeUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        for update in updates {
            sqlx::query(include_str!("../queries/upsert_mtime.sql"))
                .bind(&update.path)
                .bind(update.mtime)
                .bind(update.is_fresh(ContentField::Tags))
                .bind(update.is_fresh(ContentField::Preview))
                .bind(update.is_fresh(ContentField::FeatureImage))
                .bind(update.is_fresh(ContentField::Metadata))
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)
    }

    /// Null `field` in every record.
    ///
    /// Walks the table in path order, [`CLEAR_WINDOW`] rows per statement,
    /// so no single write holds the lock for the whole store. Returns the
    /// number of records that had a value. Emits one [`StoreEvent::Cleared`].
    #[instrument(skip(self))]
    pub async fn batch_clear_all_file_content(&self, field: ContentField) -> Result<u64> {
        let window = i64::try_from(CLEAR_WINDOW).or_raise(|| ErrorKind::InvalidData("window"))?;
        let clear = format!(
            "UPDATE files SET {column} = NULL WHERE path > ? AND path <= ? AND {column} IS NOT NULL",
            column = field.column()
        );
        let mut cursor = String::new();
        let mut cleared = 0;
        let mut windows = 0;
        loop {
            let end: Option<String> = sqlx::query_scalar(include_str!("../queries/clear_window_end.sql"))
                .bind(&cursor)
                .bind(window)
                .fetch_one(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
            let Some(end) = end else {
                break;
            };
            let result = sqlx::query(&clear)
                .bind(&cursor)
                .bind(&end)
                .execute(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
            cleared += result.rows_affected();
            windows += 1;
            cursor = end;
            tokio::task::yield_now().await;
        }
        tracing::debug!(cleared, windows, "cleared {field}");
        self.notify(StoreEvent::Cleared(field));
        Ok(cleared)
    }

    // =========================================================================
    // Vault events
    // =========================================================================

    /// Reconcile the store with a full vault listing.
    ///
    /// Creates empty records for paths not seen before and deletes records
    /// of paths that are no longer listed.
    #[instrument(skip_all, fields(paths = paths.len()))]
    pub async fn sync_files(&self, paths: &[String]) -> Result<SyncReport> {
        let known: Vec<String> = sqlx::query_scalar(include_str!("../queries/list_all_paths.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let listed: HashSet<&str> = paths.iter().map(String::as_str).collect();
        let gone: Vec<String> = known.into_iter().filter(|p| !listed.contains(p.as_str())).collect();

        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let mut added = 0;
        for path in paths {
            let result = sqlx::query(include_str!("../queries/insert_empty.sql"))
                .bind(path)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
            added += result.rows_affected();
        }
        for path in &gone {
            sqlx::query(include_str!("../queries/delete_file.sql"))
                .bind(path)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;

        if !gone.is_empty() {
            self.notify(StoreEvent::Removed(gone.clone()));
        }
        Ok(SyncReport { added, removed: gone })
    }

    /// Delete the records of deleted files. Returns how many existed.
    pub async fn delete_files(&self, paths: &[String]) -> Result<u64> {
        if paths.is_empty() {
            return Ok(0);
        }
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let mut deleted = 0;
        for path in paths {
            let result = sqlx::query(include_str!("../queries/delete_file.sql"))
                .bind(path)
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
            deleted += result.rows_affected();
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        if deleted > 0 {
            self.notify(StoreEvent::Removed(paths.to_vec()));
        }
        Ok(deleted)
    }

    /// Move a record to a new path, keeping its derived content.
    ///
    /// A record already at `to` is replaced. Returns `false` if there was no
    /// record at `from`.
    pub async fn rename_file(&self, from: impl AsRef<str>, to: impl AsRef<str>) -> Result<bool> {
        let (from, to) = (from.as_ref(), to.as_ref());
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        sqlx::query(include_str!("../queries/delete_file.sql"))
            .bind(to)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let result = sqlx::query(include_str!("../queries/rename_file.sql"))
            .bind(to)
            .bind(from)
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if result.rows_affected() == 0 {
            // Nothing to move; keep whatever was at `to`.
            tx.rollback().await.or_raise(|| ErrorKind::Database)?;
            return Ok(false);
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        self.notify(StoreEvent::Renamed { from: from.to_string(), to: to.to_string() });
        Ok(true)
    }
}
