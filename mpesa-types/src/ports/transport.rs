//! HTTP transport port.
//!
//! Implementations send signed requests to the provider and hand back the
//! decoded JSON body. Timeouts are the implementation's concern.

use serde_json::Value;

use crate::error::TransportError;

/// Port trait for the provider's HTTP API.
#[async_trait::async_trait]
pub trait MpesaTransport: Send + Sync + 'static {
    /// Calls the token-issuance endpoint with a base64 `key:secret` basic credential.
    async fn request_token(&self, basic_credential: &str) -> Result<Value, TransportError>;

    /// POSTs a JSON payload to `path` (relative to the API base URL) with a bearer token.
    async fn post(
        &self,
        path: &str,
        bearer_token: &str,
        payload: &Value,
    ) -> Result<Value, TransportError>;
}
