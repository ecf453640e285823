use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::errors::StoreError;
use crate::domain::models::Snapshot;
use crate::domain::ports::SnapshotStore;

/// A store that keeps the snapshot in memory.
///
/// Used when persistence is disabled and in tests, where the save counter
/// shows how many flushes actually reached the store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    snapshot: Arc<Mutex<Snapshot>>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `snapshot`.
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(snapshot)),
            saves: Arc::default(),
        }
    }

    /// Copy of the last saved snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        Ok(self.snapshot())
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<(), StoreError> {
        *self.snapshot.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
