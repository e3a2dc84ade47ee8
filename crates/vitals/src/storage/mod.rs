//! Storage layer for vitals.
//!
//! This module defines the [`RecordStore`] capability the dashboard talks to,
//! plus two implementations: a `SQLite`-backed durable store and a purely
//! in-memory one.
//!
//! Every store starts uninitialized. Until [`RecordStore::initialize`] has
//! completed, inserts, lists and deletes are logged no-ops.

mod memory;
pub mod schema;
mod sqlite;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::record::{NewVitals, RecordId, VitalRecord};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Which storage engine backs the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Local `SQLite` database file.
    #[default]
    Sqlite,
    /// Process memory; lost on exit.
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite => write!(f, "sqlite"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

/// The persistence boundary owning the vital record collection.
///
/// The store is the sole authority for assigning `id` and `created_at`.
#[async_trait]
pub trait RecordStore: Send + Sync + fmt::Debug {
    /// The engine behind this store.
    fn backend(&self) -> StorageBackend;

    /// Check if [`initialize`](Self::initialize) has completed.
    fn is_initialized(&self) -> bool;

    /// Ensure the storage location exists with the vitals schema.
    ///
    /// Safe to call on every start; never destroys existing records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be opened or prepared.
    async fn initialize(&self) -> Result<()>;

    /// Append a record built from `vitals`.
    ///
    /// Returns the assigned id, or `None` if the store is not initialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn insert(&self, vitals: NewVitals) -> Result<Option<RecordId>>;

    /// Every stored record, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn list_all(&self) -> Result<Vec<VitalRecord>>;

    /// Remove the record with the given id.
    ///
    /// Returns `true` if a record was deleted, `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn delete_by_id(&self, id: RecordId) -> Result<bool>;

    /// Look up a single record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn get(&self, id: RecordId) -> Result<Option<VitalRecord>>;

    /// Count stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn count(&self) -> Result<u64>;

    /// Summary statistics about the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn stats(&self) -> Result<StoreStats>;
}

/// Statistics about a record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Engine behind the store.
    pub backend: StorageBackend,
    /// Total number of records stored.
    pub total_records: u64,
    /// Timestamp of the oldest record.
    pub oldest: Option<DateTime<Utc>>,
    /// Timestamp of the newest record.
    pub newest: Option<DateTime<Utc>>,
    /// Size of the database file in bytes (zero when not file-backed).
    pub db_size_bytes: u64,
}

impl StoreStats {
    /// Stats for a store holding nothing.
    #[must_use]
    pub fn empty(backend: StorageBackend) -> Self {
        Self {
            backend,
            total_records: 0,
            oldest: None,
            newest: None,
            db_size_bytes: 0,
        }
    }
}

/// Open the store selected by `config`, uninitialized.
#[must_use]
pub fn open_store(config: &Config) -> Box<dyn RecordStore> {
    match config.storage.backend {
        StorageBackend::Sqlite => Box::new(SqliteStore::new(
            config.database_path(),
            config.storage.journal_mode,
        )),
        StorageBackend::Memory => Box::new(MemoryStore::new()),
    }
}

/// Current time at the precision records are persisted with.
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width text form of a timestamp; lexical order equals time order.
pub(crate) fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}
