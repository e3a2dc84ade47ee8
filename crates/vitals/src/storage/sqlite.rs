//! `SQLite`-backed durable record store.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::config::JournalMode;
use crate::error::{Error, Result};
use crate::record::{NewVitals, RecordId, VitalRecord};

use super::schema::{RECORD_COLUMNS, SCHEMA_STATEMENTS};
use super::{format_timestamp, timestamp_now, RecordStore, StorageBackend, StoreStats};

/// Pseudo-path used for in-memory `SQLite` databases.
const MEMORY_PATH: &str = ":memory:";

/// Record store persisted in a local `SQLite` database file.
///
/// The connection is opened lazily by [`RecordStore::initialize`]. All
/// database work runs on the blocking thread pool.
#[derive(Debug)]
pub struct SqliteStore {
    /// Path to the database file.
    path: PathBuf,
    /// Journal mode applied when the connection is opened.
    journal_mode: JournalMode,
    /// Database connection, `None` until initialized.
    conn: Arc<Mutex<Option<Connection>>>,
}

impl SqliteStore {
    /// Create a store for the database file at `path`.
    ///
    /// Nothing touches the file system until the store is initialized.
    pub fn new(path: impl AsRef<Path>, journal_mode: JournalMode) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            journal_mode,
            conn: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a store backed by an in-memory `SQLite` database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MEMORY_PATH, JournalMode::Memory)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    /// Open the connection and apply pragmas and schema.
    fn open_connection(path: &Path, journal_mode: JournalMode) -> Result<Connection> {
        let opened = if path.as_os_str() == MEMORY_PATH {
            Connection::open_in_memory()
        } else {
            // Create parent directories if needed
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
            }
            debug!("Opening database at {}", path.display());
            Connection::open(path)
        };
        let conn = opened.map_err(|source| Error::DatabaseOpen {
            path: path.to_path_buf(),
            source,
        })?;

        conn.execute_batch(&format!(
            "PRAGMA journal_mode={}; PRAGMA synchronous=NORMAL;",
            journal_mode.as_str()
        ))?;

        for statement in SCHEMA_STATEMENTS {
            conn.execute(statement, [])?;
        }

        Ok(conn)
    }

    /// Run `f` against the open connection on the blocking pool.
    ///
    /// Yields `None` without calling `f` if the store is not initialized.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<Option<T>>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::internal("database connection lock poisoned"))?;
            match guard.as_ref() {
                Some(conn) => f(conn).map(Some),
                None => {
                    warn!(operation, "vitals store used before initialization");
                    Ok(None)
                }
            }
        })
        .await?
    }

    /// Bytes used by the database file plus its write-ahead log, if any.
    fn on_disk_size(path: &Path) -> Result<u64> {
        let mut wal_path = path.as_os_str().to_owned();
        wal_path.push("-wal");

        let mut total = 0;
        for file in [path, Path::new(&wal_path)] {
            match std::fs::metadata(file) {
                Ok(meta) => total += meta.len(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    /// Convert a database row to a `VitalRecord`.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<VitalRecord> {
        let created_at_str: String = row.get(6)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

        Ok(VitalRecord {
            id: row.get(0)?,
            temperature_c: row.get(1)?,
            systolic: row.get(2)?,
            diastolic: row.get(3)?,
            heart_rate: row.get(4)?,
            notes: row.get(5)?,
            created_at,
        })
    }

    fn parse_optional_timestamp(value: Option<String>) -> Option<DateTime<Utc>> {
        value
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    fn is_initialized(&self) -> bool {
        self.conn.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    async fn initialize(&self) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let path = self.path.clone();
        let journal_mode = self.journal_mode;

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::internal("database connection lock poisoned"))?;
            if guard.is_some() {
                debug!("Database at {} already initialized", path.display());
                return Ok(());
            }
            *guard = Some(Self::open_connection(&path, journal_mode)?);
            info!("Database opened successfully at {}", path.display());
            Ok(())
        })
        .await?
    }

    async fn insert(&self, vitals: NewVitals) -> Result<Option<RecordId>> {
        self.with_conn("insert", move |conn| {
            let created_at = format_timestamp(&timestamp_now());
            conn.execute(
                r"
                INSERT INTO vitals (temperature_c, systolic, diastolic, heart_rate, notes, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    vitals.temperature_c,
                    vitals.systolic,
                    vitals.diastolic,
                    vitals.heart_rate,
                    vitals.notes,
                    created_at,
                ],
            )?;

            let id = conn.last_insert_rowid();
            debug!("Inserted vital record with id {}", id);
            Ok(id)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<VitalRecord>> {
        let records = self
            .with_conn("list_all", |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {RECORD_COLUMNS} FROM vitals ORDER BY created_at DESC, id DESC"
                ))?;
                let records = stmt
                    .query_map([], Self::row_to_record)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(records)
            })
            .await?;
        Ok(records.unwrap_or_default())
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<bool> {
        let deleted = self
            .with_conn("delete_by_id", move |conn| {
                let affected = conn.execute("DELETE FROM vitals WHERE id = ?1", [id])?;
                if affected > 0 {
                    info!("Deleted vital record {}", id);
                }
                Ok(affected > 0)
            })
            .await?;
        Ok(deleted.unwrap_or(false))
    }

    async fn get(&self, id: RecordId) -> Result<Option<VitalRecord>> {
        let record = self
            .with_conn("get", move |conn| {
                let record = conn
                    .query_row(
                        &format!("SELECT {RECORD_COLUMNS} FROM vitals WHERE id = ?1"),
                        [id],
                        Self::row_to_record,
                    )
                    .optional()?;
                Ok(record)
            })
            .await?;
        Ok(record.flatten())
    }

    async fn count(&self) -> Result<u64> {
        let count = self
            .with_conn("count", |conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM vitals", [], |row| row.get(0))?;
                Ok(u64::try_from(count).unwrap_or(0))
            })
            .await?;
        Ok(count.unwrap_or(0))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let size_path = (!self.is_memory()).then(|| self.path.clone());

        let stats = self
            .with_conn("stats", move |conn| {
                let db_size_bytes = match &size_path {
                    Some(path) => Self::on_disk_size(path)?,
                    None => 0,
                };
                let (count, oldest, newest): (i64, Option<String>, Option<String>) = conn
                    .query_row(
                        "SELECT COUNT(*), MIN(created_at), MAX(created_at) FROM vitals",
                        [],
                        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                    )?;

                Ok(StoreStats {
                    backend: StorageBackend::Sqlite,
                    total_records: u64::try_from(count).unwrap_or(0),
                    oldest: Self::parse_optional_timestamp(oldest),
                    newest: Self::parse_optional_timestamp(newest),
                    db_size_bytes,
                })
            })
            .await?;
        Ok(stats.unwrap_or_else(|| StoreStats::empty(StorageBackend::Sqlite)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create_test_store() -> SqliteStore {
        let store = SqliteStore::in_memory();
        store.initialize().await.expect("failed to initialize test store");
        store
    }

    fn full_vitals() -> NewVitals {
        NewVitals {
            temperature_c: Some(37.2),
            systolic: Some(120.0),
            diastolic: Some(80.0),
            heart_rate: Some(72.0),
            notes: Some("Todo normal".to_string()),
        }
    }

    #[tokio::test]
    async fn test_initialize_in_memory() {
        let store = SqliteStore::in_memory();
        assert!(!store.is_initialized());

        store.initialize().await.unwrap();
        assert!(store.is_initialized());
        assert_eq!(store.path().to_string_lossy(), ":memory:");
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let store = create_test_store().await;
        store.insert(full_vitals()).await.unwrap();

        store.initialize().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let store = create_test_store().await;

        let id = store.insert(full_vitals()).await.unwrap();
        assert!(id.is_some());

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id.unwrap());
        assert_eq!(records[0].vitals(), full_vitals());
    }

    #[tokio::test]
    async fn test_insert_all_absent() {
        let store = create_test_store().await;
        let id = store.insert(NewVitals::default()).await.unwrap().unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert!(record.temperature_c.is_none());
        assert!(record.systolic.is_none());
        assert!(record.diastolic.is_none());
        assert!(record.heart_rate.is_none());
        assert!(record.notes.is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = create_test_store().await;
        for i in 1..=5 {
            store
                .insert(NewVitals {
                    heart_rate: Some(f64::from(60 + i)),
                    ..NewVitals::default()
                })
                .await
                .unwrap();
        }

        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 5);
        for pair in records.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
            assert!(pair[0].id > pair[1].id);
        }
        assert_eq!(records[0].heart_rate, Some(65.0));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = create_test_store().await;
        let id = store.insert(full_vitals()).await.unwrap().unwrap();

        assert!(store.delete_by_id(id).await.unwrap());
        assert!(store.get(id).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_nonexistent() {
        let store = create_test_store().await;
        store.insert(full_vitals()).await.unwrap();

        assert!(!store.delete_by_id(99_999).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = create_test_store().await;
        let first = store.insert(full_vitals()).await.unwrap().unwrap();
        store.delete_by_id(first).await.unwrap();

        let second = store.insert(full_vitals()).await.unwrap().unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_operations_before_initialize_are_noops() {
        let store = SqliteStore::in_memory();

        assert!(store.insert(full_vitals()).await.unwrap().is_none());
        assert!(store.list_all().await.unwrap().is_empty());
        assert!(!store.delete_by_id(1).await.unwrap());
        assert!(store.get(1).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(
            store.stats().await.unwrap(),
            StoreStats::empty(StorageBackend::Sqlite)
        );
    }

    #[tokio::test]
    async fn test_stats_with_data() {
        let store = create_test_store().await;
        store.insert(full_vitals()).await.unwrap();
        store.insert(NewVitals::default()).await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_records, 2);
        assert!(stats.oldest.is_some());
        assert!(stats.oldest <= stats.newest);
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_unicode_notes() {
        let store = create_test_store().await;
        let id = store
            .insert(NewVitals {
                notes: Some("Dolor de cabeza, tomé paracetamol 💊".to_string()),
                ..NewVitals::default()
            })
            .await
            .unwrap()
            .unwrap();

        let record = store.get(id).await.unwrap().unwrap();
        assert_eq!(
            record.notes.as_deref(),
            Some("Dolor de cabeza, tomé paracetamol 💊")
        );
    }

    #[tokio::test]
    async fn test_file_backed_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("health.db");

        let store = SqliteStore::new(&db_path, JournalMode::Wal);
        store.initialize().await.unwrap();
        let id = store.insert(full_vitals()).await.unwrap().unwrap();
        assert!(db_path.exists());
        assert!(store.stats().await.unwrap().db_size_bytes > 0);
        drop(store);

        let reopened = SqliteStore::new(&db_path, JournalMode::Wal);
        reopened.initialize().await.unwrap();
        let records = reopened.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
    }

    #[tokio::test]
    async fn test_stats_counts_write_ahead_log() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let wal_path = dir.path().join("health.db-wal");

        let store = SqliteStore::new(&db_path, JournalMode::Wal);
        store.initialize().await.unwrap();
        store.insert(full_vitals()).await.unwrap();

        let stats = store.stats().await.unwrap();
        let main_len = std::fs::metadata(&db_path).unwrap().len();
        let wal_len = std::fs::metadata(&wal_path).map_or(0, |m| m.len());

        assert!(wal_path.exists());
        assert_eq!(stats.db_size_bytes, main_len + wal_len);
        assert!(stats.db_size_bytes > main_len);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_an_error() {
        let store = create_test_store().await;
        store
            .with_conn("test", |conn| {
                conn.execute(
                    "INSERT INTO vitals (created_at) VALUES ('not a timestamp')",
                    [],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let result = store.list_all().await;
        assert!(matches!(result, Err(Error::DatabaseQuery(_))));
    }
}
