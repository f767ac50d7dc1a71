//! The immutable configuration record consumed by the core.
//!
//! Loaded once at process start, wrapped in an `Arc`, and captured by each
//! component at construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CredentialMap, CredentialProfile, ServiceBinding, ServiceKind};

/// Provider environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// Base URL for API requests, with a trailing slash.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.safaricom.co.ke/",
            Self::Production => "https://api.safaricom.co.ke/",
        }
    }

    /// Token-issuance URL.
    pub fn auth_url(&self) -> String {
        format!(
            "{}oauth/v1/generate?grant_type=client_credentials",
            self.base_url()
        )
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" | "live" => Ok(Self::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

/// Callback URLs: a base URL plus optional per-service overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, alias = "services")]
    pub per_service: BTreeMap<ServiceKind, String>,
}

impl CallbackConfig {
    /// Per-service URL if set, else the base URL. Blank values are ignored.
    pub fn url_for(&self, service: ServiceKind) -> Option<&str> {
        self.per_service
            .get(&service)
            .map(String::as_str)
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.base_url.as_deref().filter(|u| !u.trim().is_empty()))
    }
}

/// Token cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_key_prefix", alias = "prefix")]
    pub key_prefix: String,
    #[serde(default = "default_ttl_seconds", alias = "ttl")]
    pub ttl_seconds: u64,
}

fn default_key_prefix() -> String {
    "mpesa_".to_string()
}

// Tokens live for an hour upstream; refresh five minutes early.
fn default_ttl_seconds() -> u64 {
    3300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Full SDK configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpesaConfig {
    #[serde(default, alias = "env")]
    pub environment: Environment,
    /// Global default credential fields.
    #[serde(default)]
    pub default_credentials: CredentialMap,
    #[serde(default)]
    pub profiles: BTreeMap<String, CredentialProfile>,
    #[serde(default)]
    pub services: BTreeMap<ServiceKind, ServiceBinding>,
    /// Deprecated flat per-service credentials, consulted only when a
    /// service has no binding.
    #[serde(default)]
    pub legacy_credentials: BTreeMap<ServiceKind, CredentialMap>,
    #[serde(default)]
    pub callbacks: CallbackConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for MpesaConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            default_credentials: CredentialMap::new(),
            profiles: BTreeMap::new(),
            services: BTreeMap::new(),
            legacy_credentials: BTreeMap::new(),
            callbacks: CallbackConfig::default(),
            cache: CacheConfig::default(),
            timeout_seconds: default_timeout_seconds(),
            logging: LoggingConfig::default(),
        }
    }
}

impl MpesaConfig {
    /// Service-specific setting from the service's binding.
    pub fn service_setting(&self, service: ServiceKind, key: &str) -> Option<&str> {
        self.services
            .get(&service)
            .and_then(|binding| binding.config.get(key))
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_prefers_service_url() {
        let mut callbacks = CallbackConfig {
            base_url: Some("https://example.com/base".into()),
            ..Default::default()
        };
        callbacks
            .per_service
            .insert(ServiceKind::Stk, "https://example.com/stk".into());

        assert_eq!(
            callbacks.url_for(ServiceKind::Stk),
            Some("https://example.com/stk")
        );
        assert_eq!(
            callbacks.url_for(ServiceKind::B2c),
            Some("https://example.com/base")
        );
    }

    #[test]
    fn test_callback_blank_values_fall_through() {
        let mut callbacks = CallbackConfig::default();
        callbacks.per_service.insert(ServiceKind::Stk, "".into());
        assert_eq!(callbacks.url_for(ServiceKind::Stk), None);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let config: MpesaConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.environment, Environment::Sandbox);
        assert_eq!(config.cache.key_prefix, "mpesa_");
        assert_eq!(config.cache.ttl_seconds, 3300);
        assert_eq!(config.timeout_seconds, 30);
        assert!(config.logging.enabled);
    }

    #[test]
    fn test_service_keyed_tables_parse() {
        let config: MpesaConfig = serde_json::from_str(
            r#"{
                "env": "production",
                "services": {"stk": {"profile": "lipa", "config": {"type": "CustomerBuyGoodsOnline"}}},
                "legacy_credentials": {"b2c": {"shortcode": "600000"}},
                "callbacks": {"base_url": "https://cb.example.com", "services": {"balance": "https://bal.example.com"}}
            }"#,
        )
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(
            config.service_setting(ServiceKind::Stk, "type"),
            Some("CustomerBuyGoodsOnline")
        );
        assert!(config.legacy_credentials.contains_key(&ServiceKind::B2c));
        assert_eq!(
            config.callbacks.url_for(ServiceKind::Balance),
            Some("https://bal.example.com")
        );
    }

    #[test]
    fn test_auth_url() {
        assert_eq!(
            Environment::Sandbox.auth_url(),
            "https://sandbox.safaricom.co.ke/oauth/v1/generate?grant_type=client_credentials"
        );
    }
}
