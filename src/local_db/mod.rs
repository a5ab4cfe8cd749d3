//! # Local Database Module
//!
//! Local persistence for the offline-first sync core. Cached entities and the
//! pending change queue live in the same embedded store, behind a minimal
//! key-value-with-filter interface.
//!
//! ## Architecture
//!
//! - [`Storage`]: `put` / `get` / `get_all` / `delete` / `count` over a fixed
//!   set of [`Table`]s. Every record is one JSON document written atomically.
//! - [`LocalDatabase`]: SQLite implementation (sqlx, WAL journal).
//! - [`MemoryStorage`]: in-process implementation for tests and throwaway
//!   sessions.
//! - [`EntityStore`]: typed cache of rental entities on top of a `Storage`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rentsync::local_db::{EntityStore, LocalDatabase};
//! use rentsync::shared::Room;
//! use std::sync::Arc;
//!
//! # async fn example() -> rentsync::shared::error::Result<()> {
//! let db = Arc::new(LocalDatabase::open("rentsync.db").await?);
//! let store = EntityStore::new(db);
//!
//! let rooms: Vec<Room> = store.get_cached(Some("property-1")).await?;
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod memory;
pub mod schema;
pub mod sync;

pub use entities::EntityStore;
pub use memory::MemoryStorage;

use crate::shared::entities::EntityType;
use crate::shared::error::{Result, SyncCoreError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;

/// Logical tables of the local store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Properties,
    Rooms,
    Tenants,
    PaymentRecords,
    PendingChanges,
    SyncMetadata,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Properties,
        Table::Rooms,
        Table::Tenants,
        Table::PaymentRecords,
        Table::PendingChanges,
        Table::SyncMetadata,
    ];

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Properties => "properties",
            Table::Rooms => "rooms",
            Table::Tenants => "tenants",
            Table::PaymentRecords => "payment_records",
            Table::PendingChanges => "pending_changes",
            Table::SyncMetadata => "sync_metadata",
        }
    }

    /// Table holding cached entities of the given type
    pub fn for_entity(entity_type: EntityType) -> Self {
        match entity_type {
            EntityType::Property => Table::Properties,
            EntityType::Room => Table::Rooms,
            EntityType::Tenant => Table::Tenants,
            EntityType::PaymentRecord => Table::PaymentRecords,
        }
    }
}

/// Equality filter on a top-level string field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filter<'a> {
    pub field: &'a str,
    pub value: &'a str,
}

impl<'a> Filter<'a> {
    pub fn eq(field: &'a str, value: &'a str) -> Self {
        Self { field, value }
    }

    /// Whether a JSON record satisfies the filter
    pub fn matches(&self, record: &Value) -> bool {
        record.get(self.field).and_then(Value::as_str) == Some(self.value)
    }
}

/// Key-value-with-filter persistence used by the entity store and the change
/// queue.
///
/// Contract:
/// - `put` is an upsert of the whole record; a replaced key keeps its
///   original insertion position.
/// - `get_all` returns records in insertion order.
/// - `delete` of a missing key returns `Ok(false)`.
#[async_trait]
pub trait Storage: Send + Sync + std::fmt::Debug {
    async fn put(&self, table: Table, key: &str, record: &Value) -> Result<()>;

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>>;

    async fn get_all(&self, table: Table, filter: Option<Filter<'_>>) -> Result<Vec<Value>>;

    async fn delete(&self, table: Table, key: &str) -> Result<bool>;

    async fn count(&self, table: Table) -> Result<usize>;
}

/// Local database connection manager
///
/// Manages the SQLite connection pool and the schema of the local store.
#[derive(Debug)]
pub struct LocalDatabase {
    pool: SqlitePool,
}

impl LocalDatabase {
    /// Open or create the local database at `path`
    ///
    /// Creates the parent directory and the file if needed, and initializes
    /// the schema. Uses WAL mode for concurrent readers during a drain.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        tracing::debug!("Opened local database at {}", path.display());
        Self::with_pool(pool).await
    }

    /// Open a private in-memory database
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Initialize database schema
    ///
    /// Creates all tables and applies pending migrations.
    async fn init_schema(&self) -> Result<()> {
        for table in Table::ALL {
            sqlx::query(&schema::create_table_sql(table))
                .execute(&self.pool)
                .await?;
        }

        self.run_migrations().await
    }

    /// Run database migrations
    ///
    /// Checks the current schema version and applies any pending migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        let current_version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;

        if !schema::needs_migration(current_version.0) {
            tracing::debug!("Local schema is at version {}", current_version.0);
            return Ok(());
        }

        for version in schema::get_pending_migrations(current_version.0) {
            for statement in schema::migration_statements(version) {
                sqlx::query(statement).execute(&self.pool).await?;
            }
            sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?, ?)")
                .bind(version)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&self.pool)
                .await?;
            tracing::info!("Applied local schema migration {}", version);
        }

        Ok(())
    }

    /// Current schema version recorded in the database
    pub async fn schema_version(&self) -> Result<i32> {
        let version: (i32,) =
            sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM schema_migrations")
                .fetch_one(&self.pool)
                .await?;
        Ok(version.0)
    }

    /// Close every connection; later operations fail with a storage error
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn decode(table: Table, key: &str, raw: &str) -> Result<Value> {
        serde_json::from_str(raw).map_err(|e| SyncCoreError::corrupt(table.name(), key, e.to_string()))
    }
}

#[async_trait]
impl Storage for LocalDatabase {
    async fn put(&self, table: Table, key: &str, record: &Value) -> Result<()> {
        let data = serde_json::to_string(record)?;
        let sql = format!(
            "INSERT INTO {} (key, record, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at",
            table.name()
        );

        sqlx::query(&sql)
            .bind(key)
            .bind(&data)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get(&self, table: Table, key: &str) -> Result<Option<Value>> {
        let sql = format!("SELECT record FROM {} WHERE key = ?", table.name());
        let row = sqlx::query(&sql).bind(key).fetch_optional(&self.pool).await?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("record")?;
                Ok(Some(Self::decode(table, key, &raw)?))
            }
            None => Ok(None),
        }
    }

    async fn get_all(&self, table: Table, filter: Option<Filter<'_>>) -> Result<Vec<Value>> {
        let rows = match filter {
            Some(filter) => {
                let sql = format!(
                    "SELECT key, record FROM {} WHERE json_extract(record, ?) = ? ORDER BY rowid ASC",
                    table.name()
                );
                sqlx::query(&sql)
                    .bind(format!("$.{}", filter.field))
                    .bind(filter.value)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT key, record FROM {} ORDER BY rowid ASC", table.name());
                sqlx::query(&sql).fetch_all(&self.pool).await?
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let key: String = row.try_get("key")?;
            let raw: String = row.try_get("record")?;
            records.push(Self::decode(table, &key, &raw)?);
        }

        Ok(records)
    }

    async fn delete(&self, table: Table, key: &str) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE key = ?", table.name());
        let result = sqlx::query(&sql).bind(key).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, table: Table) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count.0 as usize)
    }
}
