//! Domain errors for the handle resolution system.

use thiserror::Error;

/// Errors a [`Resolver`](crate::domain::ports::Resolver) may return.
///
/// The resolution service never inspects these: every variant, like a
/// missing name, is recorded as a single failure for backoff purposes.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response status: {0}")]
    Status(u16),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Resolver failed: {0}")]
    Other(String),
}

/// Snapshot store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors surfaced to callers of the resolution service.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Resolution service has shut down")]
    Closed,
}

/// Errors raised while normalizing a human-entered handle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("Handle is empty after normalization: {0:?}")]
    Empty(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for ServiceError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for ServiceError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::Closed
    }
}
