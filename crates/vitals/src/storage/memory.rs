//! In-memory record store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::record::{NewVitals, RecordId, VitalRecord};

use super::{timestamp_now, RecordStore, StorageBackend, StoreStats};

/// Record store that lives only as long as the process.
///
/// Ids come from a monotonic counter and are never handed out twice, even
/// after the record holding them is deleted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    initialized: AtomicBool,
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Records in insertion order.
    records: Vec<VitalRecord>,
    /// Last id handed out.
    last_id: RecordId,
}

impl MemoryStore {
    /// Create an empty, uninitialized store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ready(&self, operation: &'static str) -> bool {
        let ready = self.initialized.load(Ordering::SeqCst);
        if !ready {
            warn!(operation, "vitals store used before initialization");
        }
        ready
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    async fn initialize(&self) -> Result<()> {
        if !self.initialized.swap(true, Ordering::SeqCst) {
            debug!("In-memory vitals store initialized");
        }
        Ok(())
    }

    async fn insert(&self, vitals: NewVitals) -> Result<Option<RecordId>> {
        if !self.ready("insert") {
            return Ok(None);
        }

        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        state
            .records
            .push(VitalRecord::from_new(id, timestamp_now(), vitals));

        debug!("Inserted vital record with id {}", id);
        Ok(Some(id))
    }

    async fn list_all(&self) -> Result<Vec<VitalRecord>> {
        if !self.ready("list_all") {
            return Ok(Vec::new());
        }

        let state = self.state.read().await;
        let mut records = state.records.clone();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    async fn delete_by_id(&self, id: RecordId) -> Result<bool> {
        if !self.ready("delete_by_id") {
            return Ok(false);
        }

        let mut state = self.state.write().await;
        let before = state.records.len();
        state.records.retain(|record| record.id != id);
        Ok(state.records.len() < before)
    }

    async fn get(&self, id: RecordId) -> Result<Option<VitalRecord>> {
        if !self.ready("get") {
            return Ok(None);
        }

        let state = self.state.read().await;
        Ok(state.records.iter().find(|record| record.id == id).cloned())
    }

    async fn count(&self) -> Result<u64> {
        if !self.ready("count") {
            return Ok(0);
        }

        let state = self.state.read().await;
        Ok(state.records.len() as u64)
    }

    async fn stats(&self) -> Result<StoreStats> {
        if !self.ready("stats") {
            return Ok(StoreStats::empty(StorageBackend::Memory));
        }

        let state = self.state.read().await;
        let timestamps = state.records.iter().map(|record| record.created_at);
        Ok(StoreStats {
            backend: StorageBackend::Memory,
            total_records: state.records.len() as u64,
            oldest: timestamps.clone().min(),
            newest: timestamps.max(),
            db_size_bytes: 0,
        })
    }
}
