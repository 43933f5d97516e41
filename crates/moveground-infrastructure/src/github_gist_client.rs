//! Read-only GitHub gist client used for share-id imports.

use async_trait::async_trait;
use moveground_core::config::{DEFAULT_GIST_API_URL, EditorConfig};
use moveground_core::error::{MovegroundError, Result};
use moveground_core::gist::{Gist, GistService};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

const USER_AGENT: &str = "moveground";

/// `GistService` backed by `GET {base}/gists/{id}`.
#[derive(Clone)]
pub struct GithubGistClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GithubGistClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.gist_api_url.clone()).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{base}/gists/{id}`, with `id` escaped as a single path segment.
    pub fn gist_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            MovegroundError::config(format!("Invalid gist API URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                MovegroundError::config(format!("Gist API URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .push("gists")
            .push(id);
        Ok(url)
    }
}

impl Default for GithubGistClient {
    fn default() -> Self {
        Self::new(DEFAULT_GIST_API_URL)
    }
}

#[async_trait]
impl GistService for GithubGistClient {
    async fn fetch_gist(&self, id: &str) -> Result<Option<Gist>> {
        let url = self.gist_url(id)?;
        tracing::debug!(target: "import", %url, "Fetching gist");

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MovegroundError::network(format!("Gist request failed: {}", e)))?;

        if let Some(remaining) = response.headers().get("X-RateLimit-Remaining") {
            tracing::debug!(
                target: "import",
                "Gist API requests remaining: {}",
                remaining.to_str().unwrap_or_default()
            );
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(MovegroundError::http_status(
                status.as_u16(),
                format!("Gist API returned {}", status),
            ));
        }

        let gist = response
            .json::<Gist>()
            .await
            .map_err(|e| MovegroundError::network(format!("Failed to parse gist: {}", e)))?;
        Ok(Some(gist))
    }
}
