use async_trait::async_trait;

use crate::domain::errors::ResolveError;

/// Port for looking up the display name behind a handle
///
/// Implementations reach the remote source (see
/// [`HttpResolver`](crate::infrastructure::http::HttpResolver)). The
/// resolution service treats `Ok(None)` and every `Err` the same way: as
/// one failure counted towards the backoff threshold.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use handle_resolver::domain::errors::ResolveError;
/// use handle_resolver::domain::ports::Resolver;
///
/// struct Uppercase;
///
/// #[async_trait]
/// impl Resolver for Uppercase {
///     async fn resolve(&self, handle: &str) -> Result<Option<String>, ResolveError> {
///         Ok(Some(handle.trim_start_matches('@').to_uppercase()))
///     }
/// }
/// ```
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve `handle` to a display name, if the source has one
    async fn resolve(&self, handle: &str) -> Result<Option<String>, ResolveError>;
}
