//! Handle resolver - cached, rate-limited handle to display-name resolution
//!
//! Resolves opaque channel handles (such as `@foo`) to display names through
//! a pluggable resolver, keeping results in a bounded, persisted LRU cache
//! with TTL expiry and failure backoff.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Service Layer** (`services`): name cache, fetch scheduler, persistence
//!   coordinator and the resolution service event loop
//! - **Infrastructure Layer** (`infrastructure`): HTTP resolver, snapshot
//!   stores, notifier, configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use handle_resolver::{Config, HttpResolver, JsonFileStore, Priority, ResolutionService};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let resolver = Arc::new(HttpResolver::new(&config.resolver)?);
//! let store = Arc::new(JsonFileStore::new(&config.persistence.path));
//!
//! let service = ResolutionService::builder(resolver, store)
//!     .config(&config)
//!     .start();
//!
//! let outcome = service.resolve("@foo", Priority::High).await?;
//! println!("{:?}", outcome.name());
//! service.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{HandleError, ResolveError, ServiceError, StoreError};
pub use domain::models::{
    normalize_handle, CacheConfig, CacheEntry, CacheStats, Config, ExtractionStrategy,
    LoggingConfig, PersistenceConfig, Priority, ResolveOutcome, ResolverConfig, SchedulerConfig,
    SchedulerState, Snapshot,
};
pub use domain::ports::{Clock, ManualClock, Notifier, NullNotifier, Resolver, SnapshotStore, SystemClock};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::http::HttpResolver;
pub use infrastructure::notify::{BroadcastNotifier, NameResolved};
pub use infrastructure::storage::{InMemoryStore, JsonFileStore};
pub use services::{ResolutionService, ResolutionServiceBuilder};
