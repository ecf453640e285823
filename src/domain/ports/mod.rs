//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the resolution service depends on:
//! - Resolver: remote handle to display-name lookup
//! - SnapshotStore: durable load/save of the whole cache
//! - Notifier: consumer callback for successful resolutions
//! - Clock: wall-clock time for TTL and cooldown checks
//!
//! Infrastructure adapters implement these traits, keeping the service
//! independent of HTTP, file systems and real time.

pub mod clock;
pub mod notifier;
pub mod resolver;
pub mod snapshot_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use notifier::{Notifier, NullNotifier};
pub use resolver::Resolver;
pub use snapshot_store::SnapshotStore;
