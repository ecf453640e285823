//! Infrastructure layer module
//!
//! This module contains the adapters and ambient plumbing:
//! - HTTP resolver (reqwest)
//! - Snapshot stores (JSON file, in-memory)
//! - Broadcast notifier
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod http;
pub mod logging;
pub mod notify;
pub mod storage;
