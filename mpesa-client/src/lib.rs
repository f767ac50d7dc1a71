//! # M-Pesa Client
//!
//! Reqwest-backed [`MpesaTransport`] adapter for the provider's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use mpesa_types::{MpesaConfig, MpesaTransport, TransportError};

/// Error type for building the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP transport for the provider API.
pub struct HttpTransport {
    base_url: String,
    auth_url: String,
    http: Client,
}

impl HttpTransport {
    /// Creates a transport for the configured environment and timeout.
    pub fn new(config: &MpesaConfig) -> Result<Self, ClientError> {
        Self::with_urls(
            config.environment.base_url(),
            config.environment.auth_url(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Creates a transport against explicit endpoints.
    pub fn with_urls(
        base_url: impl Into<String>,
        auth_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_url: auth_url.into(),
            http: Client::builder().timeout(timeout).build()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, TransportError> {
        let status = resp.status();
        let body = resp.text().await.map_err(network)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "M-Pesa API returned an error");
            return Err(TransportError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn network(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

#[async_trait]
impl MpesaTransport for HttpTransport {
    async fn request_token(&self, basic_credential: &str) -> Result<Value, TransportError> {
        let resp = self
            .http
            .get(&self.auth_url)
            .header("Authorization", format!("Basic {}", basic_credential))
            .send()
            .await
            .map_err(network)?;
        self.handle_response(resp).await
    }

    async fn post(
        &self,
        path: &str,
        bearer_token: &str,
        payload: &Value,
    ) -> Result<Value, TransportError> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(bearer_token)
            .json(payload)
            .send()
            .await
            .map_err(network)?;
        self.handle_response(resp).await
    }
}
