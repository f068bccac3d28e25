//! SQLite pool, migrations and the change channel.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteAutoVacuum, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::instrument;

use crate::StoreEvent;
use crate::error::{ErrorKind, Result};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Reads run alongside the engine's batch writes.
const MAX_CONNECTIONS: u32 = 4;
// Every connection to ":memory:" opens its own empty database.
const IN_MEMORY_CONNECTIONS: u32 = 1;
// Subscribers lagging further than this miss events (and should resync).
const EVENT_CAPACITY: usize = 256;
// A full clear of a large vault holds the write lock for a series of short
// windows; readers wait rather than fail.
const BUSY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Handle to the content store.
///
/// Owns the SQLite pool and the change notification channel shared by every
/// [`Repository`](crate::Repository) created from it. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    events: broadcast::Sender<StoreEvent>,
}

impl Database {
    /// Open (or create) the store file at `path` and bring its schema up to date.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::options().filename(path.as_ref()).create_if_missing(true);
        Self::open(options, MAX_CONNECTIONS).await
    }

    /// A throwaway store that lives as long as its pool.
    ///
    /// Not behind `#[cfg(test)]`: other crates use it as a test fixture.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::options().filename(":memory:");
        Self::open(options, IN_MEMORY_CONNECTIONS).await
    }

    async fn open(options: SqliteConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // PRAGMAs run per connection, so every pooled connection needs them.
            .after_connect(|conn, meta| Box::pin(async move { Self::tune(conn, meta).await }))
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let db = Self { pool, events };
        db.migrate().await?;
        Ok(db)
    }

    fn options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .auto_vacuum(SqliteAutoVacuum::None)
    }

    async fn tune(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 800;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    #[instrument("migrating content store", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) fn events(&self) -> &broadcast::Sender<StoreEvent> {
        &self.events
    }

    /// Wait for outstanding connections, then close the pool.
    pub async fn close(&self) {
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
