//! HTTP fetching for external link validation.

use std::time::Duration;

use ureq::Agent;

/// Default timeout for validating an external link.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error fetching an external page.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}")]
    Status { status: u16, body: String },
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Source of page bodies for external links.
pub trait Fetch: Send + Sync {
    /// GET `url` and return the body of a 2xx response.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetch`] over HTTP(S) with a shared connection pool.
pub struct HttpFetcher {
    agent: Agent,
}

impl HttpFetcher {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        // Status codes are checked by hand so the body is kept for diagnostics.
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| FetchError::Body(e.to_string()))?;

        if (200..300).contains(&status) {
            Ok(body)
        } else {
            Err(FetchError::Status { status, body })
        }
    }
}
