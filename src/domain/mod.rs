//! Domain layer for the handle resolution system
//!
//! This module contains the core data model and the port traits through which
//! the resolution service reaches its external collaborators.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{HandleError, ResolveError, ServiceError, ServiceResult, StoreError};
