//! HTTP client for the playground build/format/share service.

use async_trait::async_trait;
use moveground_core::code::{
    BuildOutput, CodeRequest, FormatOutput, OperationKind, PlaygroundApi, ShareLink,
};
use moveground_core::config::EditorConfig;
use moveground_core::error::{MovegroundError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// `PlaygroundApi` over HTTP. Every endpoint is `POST {base}/{kind}` with a
/// JSON [`CodeRequest`] body.
#[derive(Clone)]
pub struct HttpPlaygroundApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPlaygroundApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.api_url.clone()).with_timeout(config.request_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, kind: OperationKind) -> String {
        format!("{}/{}", self.base_url, kind.as_str())
    }

    async fn post<T: DeserializeOwned>(&self, kind: OperationKind, request: &CodeRequest) -> Result<T> {
        let url = self.endpoint(kind);
        tracing::debug!(target: "playground_api", %url, module = %request.name, "POST");

        let response = self
            .client
            .post(&url)
            .json(request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| MovegroundError::network(format!("{} request failed: {}", kind, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(target: "playground_api", %status, "Error body: {}", error_text);
            return Err(MovegroundError::http_status(
                status.as_u16(),
                format!("{} returned {}", kind, status),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MovegroundError::network(format!("Failed to parse {} response: {}", kind, e)))
    }
}

#[async_trait]
impl PlaygroundApi for HttpPlaygroundApi {
    async fn build(&self, request: &CodeRequest) -> Result<BuildOutput> {
        self.post(OperationKind::Build, request).await
    }

    async fn format(&self, request: &CodeRequest) -> Result<FormatOutput> {
        self.post(OperationKind::Format, request).await
    }

    async fn share(&self, request: &CodeRequest) -> Result<ShareLink> {
        self.post(OperationKind::Share, request).await
    }
}
