//! CLI command implementations.

pub mod add;
pub mod cache;
pub mod resolve;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::domain::models::Config;
use crate::domain::ports::SnapshotStore;
use crate::infrastructure::http::HttpResolver;
use crate::infrastructure::storage::{InMemoryStore, JsonFileStore};
use crate::services::ResolutionService;

/// Start a resolution service backed by the HTTP resolver.
///
/// `ephemeral` swaps the JSON file store for an in-memory one.
pub fn start_service(config: &Config, ephemeral: bool) -> Result<ResolutionService> {
    let resolver = HttpResolver::new(&config.resolver).context("Failed to build HTTP resolver")?;
    let store: Arc<dyn SnapshotStore> = if ephemeral {
        Arc::new(InMemoryStore::new())
    } else {
        Arc::new(JsonFileStore::new(&config.persistence.path))
    };

    Ok(ResolutionService::builder(Arc::new(resolver), store)
        .config(config)
        .start())
}
