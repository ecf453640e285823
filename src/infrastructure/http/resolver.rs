use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::extract::extract_name;
use crate::domain::errors::ResolveError;
use crate::domain::models::{ExtractionStrategy, ResolverConfig};
use crate::domain::ports::Resolver;

/// Resolver that scrapes the display name from a handle's channel page.
///
/// Each lookup is one `GET {base_url}/{handle}/about` without cookies. A
/// non-success status, a transport error and a page with no recognizable
/// name all come back as failures; the caller does not tell them apart.
pub struct HttpResolver {
    /// Reusable HTTP client with connection pooling
    http_client: ReqwestClient,

    /// Base URL handles are appended to, without trailing slash
    base_url: String,

    extraction: ExtractionStrategy,
}

impl HttpResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ResolveError::InvalidBaseUrl(config.base_url.clone()));
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
            extraction: config.extraction,
        })
    }

    fn about_url(&self, handle: &str) -> String {
        format!("{}/{}/about", self.base_url, handle)
    }
}

#[async_trait]
impl Resolver for HttpResolver {
    #[instrument(skip(self), level = "debug")]
    async fn resolve(&self, handle: &str) -> Result<Option<String>, ResolveError> {
        let response = self.http_client.get(self.about_url(handle)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        let name = extract_name(&html, self.extraction);
        debug!(found = name.is_some(), bytes = html.len(), "channel page fetched");
        Ok(name)
    }
}
