pub mod config;
pub mod entry;
pub mod handle;
pub mod request;

pub use config::{
    CacheConfig, Config, ExtractionStrategy, LoggingConfig, PersistenceConfig, ResolverConfig,
    SchedulerConfig,
};
pub use entry::{CacheEntry, CacheStats, Snapshot};
pub use handle::normalize_handle;
pub use request::{Priority, ResolveOutcome, SchedulerState};
