//! Credential fields and resolved credential sets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Flat mapping of credential-field name to value.
pub type CredentialMap = BTreeMap<String, String>;

/// The credential fields the provider API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    ConsumerKey,
    ConsumerSecret,
    #[serde(rename = "shortcode")]
    ShortCode,
    #[serde(rename = "passkey")]
    PassKey,
    #[serde(rename = "initiator")]
    InitiatorName,
    SecurityCredential,
}

impl CredentialField {
    /// Key used for this field in profiles, bindings and legacy entries.
    pub fn key(&self) -> &'static str {
        match self {
            Self::ConsumerKey => "consumer_key",
            Self::ConsumerSecret => "consumer_secret",
            Self::ShortCode => "shortcode",
            Self::PassKey => "passkey",
            Self::InitiatorName => "initiator",
            Self::SecurityCredential => "security_credential",
        }
    }

    /// Whether the value must never be printed in clear.
    pub fn is_secret(&self) -> bool {
        matches!(
            self,
            Self::ConsumerSecret | Self::PassKey | Self::SecurityCredential
        )
    }

    pub fn all() -> &'static [CredentialField] {
        &[
            Self::ConsumerKey,
            Self::ConsumerSecret,
            Self::ShortCode,
            Self::PassKey,
            Self::InitiatorName,
            Self::SecurityCredential,
        ]
    }
}

impl std::fmt::Display for CredentialField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The final flat credential mapping used to build one provider request.
///
/// Produced fresh on every resolution. Empty values are treated as absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredentials {
    fields: CredentialMap,
}

impl ResolvedCredentials {
    pub fn new(fields: CredentialMap) -> Self {
        Self { fields }
    }

    /// Returns the value of a field, or `None` when missing or blank.
    pub fn get(&self, field: CredentialField) -> Option<&str> {
        self.get_raw(field.key())
    }

    /// Looks up any key, including non-standard fields carried by a profile.
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns the value of a field or a `MissingField` error.
    pub fn require(&self, field: CredentialField) -> Result<&str, ConfigError> {
        self.get(field).ok_or(ConfigError::MissingField(field))
    }

    pub fn consumer_key(&self) -> Option<&str> {
        self.get(CredentialField::ConsumerKey)
    }

    pub fn consumer_secret(&self) -> Option<&str> {
        self.get(CredentialField::ConsumerSecret)
    }

    pub fn short_code(&self) -> Option<&str> {
        self.get(CredentialField::ShortCode)
    }

    pub fn pass_key(&self) -> Option<&str> {
        self.get(CredentialField::PassKey)
    }

    pub fn initiator_name(&self) -> Option<&str> {
        self.get(CredentialField::InitiatorName)
    }

    pub fn security_credential(&self) -> Option<&str> {
        self.get(CredentialField::SecurityCredential)
    }

    pub fn as_map(&self) -> &CredentialMap {
        &self.fields
    }

    pub fn into_map(self) -> CredentialMap {
        self.fields
    }
}

impl From<CredentialMap> for ResolvedCredentials {
    fn from(fields: CredentialMap) -> Self {
        Self::new(fields)
    }
}

// Secrets stay out of logs and panics.
impl std::fmt::Debug for ResolvedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.fields {
            let secret = CredentialField::all()
                .iter()
                .any(|field| field.key() == key && field.is_secret());
            if secret {
                map.entry(key, &"***");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(pairs: &[(&str, &str)]) -> ResolvedCredentials {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<CredentialMap>()
            .into()
    }

    #[test]
    fn test_blank_values_are_absent() {
        let c = creds(&[("consumer_key", "  "), ("shortcode", "174379")]);
        assert_eq!(c.consumer_key(), None);
        assert_eq!(c.short_code(), Some("174379"));
    }

    #[test]
    fn test_require_reports_field() {
        let c = creds(&[("consumer_key", "key")]);
        assert_eq!(
            c.require(CredentialField::PassKey),
            Err(ConfigError::MissingField(CredentialField::PassKey))
        );
        assert_eq!(c.require(CredentialField::ConsumerKey), Ok("key"));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let c = creds(&[("consumer_key", "visible"), ("consumer_secret", "hidden")]);
        let printed = format!("{:?}", c);
        assert!(printed.contains("visible"));
        assert!(!printed.contains("hidden"));
    }
}
