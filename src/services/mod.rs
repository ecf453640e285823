//! Service layer
//!
//! The resolution core: the name cache, the fetch scheduler, the persistence
//! coordinator and the event loop that owns all three.

pub mod fetch_scheduler;
pub mod name_cache;
pub mod persistence;
pub mod resolution_service;

pub use fetch_scheduler::FetchScheduler;
pub use name_cache::NameCache;
pub use persistence::{FlushState, PersistenceCoordinator};
pub use resolution_service::{ResolutionService, ResolutionServiceBuilder};
