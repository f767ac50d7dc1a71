//! Bearer-token provider.
//!
//! Tokens are cached under a key derived from the resolved consumer
//! key/secret pair, not from the service name: services sharing a pair
//! share one token, and rebinding a service changes its key. Every key
//! handed out is also recorded per service so bulk invalidation reaches
//! binding-only services too.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};

use mpesa_types::{
    AuthError, CredentialField, MpesaConfig, MpesaError, MpesaTransport, ResolvedCredentials,
    ServiceKind, TokenCache, TransportError,
};

use crate::credentials::CredentialSelector;
use crate::security::{basic_credential, credential_fingerprint};

/// Issues and caches bearer tokens per credential pair.
pub struct TokenProvider<T: MpesaTransport, C: TokenCache> {
    config: Arc<MpesaConfig>,
    selector: CredentialSelector,
    transport: Arc<T>,
    cache: Arc<C>,
    /// Last cache key handed out per service (`None` = global defaults).
    issued: DashMap<Option<ServiceKind>, String>,
}

impl<T: MpesaTransport, C: TokenCache> TokenProvider<T, C> {
    pub fn new(config: Arc<MpesaConfig>, transport: Arc<T>, cache: Arc<C>) -> Self {
        Self {
            selector: CredentialSelector::new(config.clone()),
            config,
            transport,
            cache,
            issued: DashMap::new(),
        }
    }

    /// Returns a bearer token for `service` (global defaults for `None`),
    /// issuing one upstream on a cache miss.
    #[instrument(skip(self))]
    pub async fn get_token(&self, service: Option<ServiceKind>) -> Result<String, MpesaError> {
        let credentials = self.selector.credentials_for(service)?;
        let key = self.cache_key(&credentials)?;
        self.issued.insert(service, key.clone());

        if let Some(token) = self.cache.get(&key).await {
            debug!("Using cached access token");
            return Ok(token);
        }

        let consumer_key = credentials.require(CredentialField::ConsumerKey)?;
        let consumer_secret = credentials.require(CredentialField::ConsumerSecret)?;
        let token = self.generate_token(consumer_key, consumer_secret).await?;

        self.cache
            .put(&key, token.clone(), Duration::from_secs(self.config.cache.ttl_seconds))
            .await;
        info!("Issued new access token");
        Ok(token)
    }

    /// Requests a fresh token for an explicit pair. Never touches the cache.
    pub async fn generate_token(
        &self,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> Result<String, MpesaError> {
        let credential = basic_credential(consumer_key, consumer_secret);

        let body = match self.transport.request_token(&credential).await {
            Ok(body) => body,
            Err(TransportError::RequestFailed { status, body }) => {
                warn!(status, "Token request rejected");
                return Err(AuthError::RequestFailed { status, body }.into());
            }
            Err(e) => return Err(e.into()),
        };

        body.get("access_token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(String::from)
            .ok_or_else(|| AuthError::InvalidResponse(body.to_string()).into())
    }

    /// Drops cached tokens.
    ///
    /// With a service, removes only the key that service currently derives.
    /// Without one, removes the default key, every legacy-table service's
    /// key, and every key recorded by `get_token`. Pairs that no longer
    /// resolve are skipped; recorded keys are always removed.
    #[instrument(skip(self))]
    pub async fn invalidate(&self, service: Option<ServiceKind>) -> Result<(), MpesaError> {
        if let Some(service) = service {
            let key = self.key_for(Some(service))?;
            self.cache.forget(&key).await;
            self.issued.remove(&Some(service));
            debug!(%key, "Invalidated service token");
            return Ok(());
        }

        let mut keys = Vec::new();
        let derived = std::iter::once(None).chain(self.selector.legacy_services().map(Some));
        for service in derived {
            match self.key_for(service) {
                Ok(key) => keys.push(key),
                // Nothing can have been cached under a pair that does not resolve.
                Err(e) => debug!(?service, error = %e, "Skipping unresolvable credentials"),
            }
        }
        keys.extend(self.issued.iter().map(|entry| entry.value().clone()));
        self.issued.clear();

        keys.sort();
        keys.dedup();
        for key in &keys {
            self.cache.forget(key).await;
        }
        info!(count = keys.len(), "Invalidated all cached tokens");
        Ok(())
    }

    /// Cache key `service` currently resolves to.
    pub fn key_for(&self, service: Option<ServiceKind>) -> Result<String, MpesaError> {
        let credentials = self.selector.credentials_for(service)?;
        self.cache_key(&credentials)
    }

    fn cache_key(&self, credentials: &ResolvedCredentials) -> Result<String, MpesaError> {
        let consumer_key = credentials.require(CredentialField::ConsumerKey)?;
        let consumer_secret = credentials.require(CredentialField::ConsumerSecret)?;
        Ok(format!(
            "{}access_token_{}",
            self.config.cache.key_prefix,
            credential_fingerprint(consumer_key, consumer_secret)
        ))
    }
}
