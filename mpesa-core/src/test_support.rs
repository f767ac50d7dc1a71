//! Shared fixtures for the core's unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use mpesa_types::{
    CallbackConfig, CredentialMap, CredentialProfile, MpesaConfig, MpesaTransport, ServiceBinding,
    ServiceKind, TokenCache, TransportError,
};

pub fn fields(pairs: &[(&str, &str)]) -> CredentialMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The stock profile layout with distinct values per level.
pub fn sample_config() -> MpesaConfig {
    let mut config = MpesaConfig {
        default_credentials: fields(&[
            ("consumer_key", "global-key"),
            ("consumer_secret", "global-secret"),
            ("shortcode", "600000"),
            ("passkey", "global-passkey"),
            ("initiator", "global-op"),
            ("security_credential", "global-credential"),
        ]),
        callbacks: CallbackConfig {
            base_url: Some("https://callbacks.example.com/mpesa/".into()),
            ..Default::default()
        },
        ..Default::default()
    };

    config.profiles.insert(
        "default".into(),
        CredentialProfile::new(fields(&[
            ("consumer_key", "default-key"),
            ("consumer_secret", "default-secret"),
            ("shortcode", "174379"),
        ])),
    );
    config.profiles.insert(
        "lipa_na_mpesa".into(),
        CredentialProfile::extending("default", fields(&[("passkey", "lipa-passkey")])),
    );
    config.profiles.insert(
        "business_operations".into(),
        CredentialProfile::extending(
            "default",
            fields(&[("initiator", "biz-op"), ("security_credential", "biz-cred")]),
        ),
    );
    config.profiles.insert(
        "withdrawal".into(),
        CredentialProfile::new(fields(&[
            ("consumer_key", "w-key"),
            ("consumer_secret", "w-secret"),
            ("shortcode", "300300"),
            ("initiator", "w-op"),
            ("security_credential", "w-cred"),
        ])),
    );

    config.services.insert(
        ServiceKind::Stk,
        ServiceBinding::to_profile("lipa_na_mpesa").with_setting("type", "CustomerPayBillOnline"),
    );
    config
        .services
        .insert(ServiceKind::C2b, ServiceBinding::to_profile("default"));
    for service in [
        ServiceKind::B2c,
        ServiceKind::B2b,
        ServiceKind::Balance,
        ServiceKind::Reversal,
    ] {
        config
            .services
            .insert(service, ServiceBinding::to_profile("business_operations"));
    }
    config
        .services
        .insert(ServiceKind::Withdrawal, ServiceBinding::to_profile("withdrawal"));
    config.callbacks.per_service.insert(
        ServiceKind::Stk,
        "https://callbacks.example.com/stk/".into(),
    );
    config
}

/// One recorded POST: path, bearer token, payload.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub path: String,
    pub token: String,
    pub payload: Value,
}

/// Transport double that records every call.
///
/// By default each basic credential gets its own token (`token:<credential>`)
/// and every POST is acknowledged with `ResponseCode` `0`.
pub struct MockTransport {
    token_response: Mutex<Option<Result<Value, TransportError>>>,
    post_response: Mutex<Result<Value, TransportError>>,
    token_requests: Mutex<Vec<String>>,
    posts: Mutex<Vec<RecordedPost>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            token_response: Mutex::new(None),
            post_response: Mutex::new(Ok(json!({
                "ResponseCode": "0",
                "ResponseDescription": "Accept the service request successfully."
            }))),
            token_requests: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn respond_to_tokens_with(&self, response: Result<Value, TransportError>) {
        *self.token_response.lock().unwrap() = Some(response);
    }

    pub fn respond_to_posts_with(&self, response: Result<Value, TransportError>) {
        *self.post_response.lock().unwrap() = response;
    }

    pub fn token_requests(&self) -> Vec<String> {
        self.token_requests.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    pub fn last_post(&self) -> RecordedPost {
        self.posts
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was posted")
    }
}

#[async_trait]
impl MpesaTransport for MockTransport {
    async fn request_token(&self, basic_credential: &str) -> Result<Value, TransportError> {
        self.token_requests
            .lock()
            .unwrap()
            .push(basic_credential.to_string());
        match self.token_response.lock().unwrap().clone() {
            Some(response) => response,
            None => Ok(json!({
                "access_token": format!("token:{}", basic_credential),
                "expires_in": "3599"
            })),
        }
    }

    async fn post(
        &self,
        path: &str,
        bearer_token: &str,
        payload: &Value,
    ) -> Result<Value, TransportError> {
        self.posts.lock().unwrap().push(RecordedPost {
            path: path.to_string(),
            token: bearer_token.to_string(),
            payload: payload.clone(),
        });
        self.post_response.lock().unwrap().clone()
    }
}

/// Cache double without expiry.
#[derive(Default)]
pub struct MapCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MapCache {
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.entries.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl TokenCache for MapCache {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    async fn put(&self, key: &str, value: String, _ttl: Duration) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    async fn forget(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

pub fn shared(config: MpesaConfig) -> (Arc<MpesaConfig>, Arc<MockTransport>, Arc<MapCache>) {
    (
        Arc::new(config),
        Arc::new(MockTransport::new()),
        Arc::new(MapCache::default()),
    )
}
