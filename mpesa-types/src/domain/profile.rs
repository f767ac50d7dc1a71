//! Credential profiles and service bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::CredentialMap;

/// A named, inheritable bundle of credential fields.
///
/// `extends` names a parent profile whose effective fields this profile
/// overlays. It is never part of `fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(flatten)]
    pub fields: CredentialMap,
}

impl CredentialProfile {
    pub fn new(fields: CredentialMap) -> Self {
        Self {
            extends: None,
            fields,
        }
    }

    pub fn extending(parent: impl Into<String>, fields: CredentialMap) -> Self {
        Self {
            extends: Some(parent.into()),
            fields,
        }
    }
}

/// Binds a service to a profile, plus field-level overrides and
/// service-specific settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default, alias = "credentials", skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: CredentialMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub config: BTreeMap<String, String>,
}

fn default_profile() -> String {
    "default".to_string()
}

impl ServiceBinding {
    pub fn to_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            overrides: CredentialMap::new(),
            config: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_extends_is_not_a_field() {
        let profile: CredentialProfile =
            serde_json::from_str(r#"{"extends": "default", "passkey": "pk"}"#).unwrap();
        assert_eq!(profile.extends.as_deref(), Some("default"));
        assert_eq!(profile.fields.len(), 1);
        assert!(!profile.fields.contains_key("extends"));
    }

    #[test]
    fn test_binding_defaults_and_credentials_alias() {
        let binding: ServiceBinding =
            serde_json::from_str(r#"{"credentials": {"shortcode": "999"}}"#).unwrap();
        assert_eq!(binding.profile, "default");
        assert_eq!(binding.overrides.get("shortcode").map(String::as_str), Some("999"));
        assert!(binding.config.is_empty());
    }
}
