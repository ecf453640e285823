use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::models::Snapshot;

/// Port for durable storage of the whole name cache
///
/// The store only ever sees complete snapshots: one load at service start and
/// a full replacement on every flush. Both operations are best effort; the
/// resolution service logs failures and carries on.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, or an empty one when nothing was saved
    async fn load_snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Replace the stored snapshot
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<(), StoreError>;
}
