//! Snapshot store adapters
//!
//! - `JsonFileStore`: durable JSON file with atomic replace
//! - `InMemoryStore`: process-local store for tests and `--ephemeral` runs

pub mod json_file;
pub mod memory;

pub use json_file::{JsonFileStore, CACHE_KEY};
pub use memory::InMemoryStore;
