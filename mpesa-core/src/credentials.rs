//! Credential selection per service.
//!
//! Resolution order for a service:
//! 1. its binding: the bound profile, overlaid by the binding's overrides;
//! 2. otherwise its legacy table entry, overlaid on the global defaults;
//! 3. otherwise the global defaults.
//!
//! Exactly one path is used per call; binding and legacy data never mix.

use std::sync::Arc;

use mpesa_types::{
    ConfigError, CredentialMap, MpesaConfig, ResolvedCredentials, ServiceBinding, ServiceKind,
};

use crate::profile::ProfileResolver;

/// Which resolution path produced a service's credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Binding { profile: String },
    Legacy,
    Defaults,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binding { profile } => write!(f, "profile '{}'", profile),
            Self::Legacy => write!(f, "legacy credentials"),
            Self::Defaults => write!(f, "global defaults"),
        }
    }
}

/// Maps a service to its concrete credential set.
#[derive(Debug, Clone)]
pub struct CredentialSelector {
    config: Arc<MpesaConfig>,
}

impl CredentialSelector {
    pub fn new(config: Arc<MpesaConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MpesaConfig {
        &self.config
    }

    /// Resolves credentials for `service`, or the global defaults for `None`.
    pub fn credentials_for(
        &self,
        service: Option<ServiceKind>,
    ) -> Result<ResolvedCredentials, ConfigError> {
        let Some(service) = service else {
            return Ok(self.defaults().into());
        };

        if let Some(binding) = self.config.services.get(&service) {
            return self.from_binding(binding);
        }
        match self.config.legacy_credentials.get(&service) {
            Some(entry) => Ok(self.from_legacy(entry).into()),
            None => Ok(self.defaults().into()),
        }
    }

    /// Reports the resolution path `service` takes, without resolving it.
    pub fn source(&self, service: ServiceKind) -> CredentialSource {
        if let Some(binding) = self.config.services.get(&service) {
            CredentialSource::Binding {
                profile: binding.profile.clone(),
            }
        } else if self.config.legacy_credentials.contains_key(&service) {
            CredentialSource::Legacy
        } else {
            CredentialSource::Defaults
        }
    }

    /// Services that have a legacy credential entry.
    pub fn legacy_services(&self) -> impl Iterator<Item = ServiceKind> + '_ {
        self.config.legacy_credentials.keys().copied()
    }

    fn from_binding(&self, binding: &ServiceBinding) -> Result<ResolvedCredentials, ConfigError> {
        let mut fields = ProfileResolver::new(&self.config.profiles).resolve(&binding.profile)?;
        fields.extend(
            binding
                .overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Ok(fields.into())
    }

    fn from_legacy(&self, entry: &CredentialMap) -> CredentialMap {
        let mut fields = self.defaults();
        fields.extend(entry.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }

    fn defaults(&self) -> CredentialMap {
        self.config.default_credentials.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fields, sample_config};
    use mpesa_types::{CredentialField, CredentialProfile};

    fn selector(config: MpesaConfig) -> CredentialSelector {
        CredentialSelector::new(Arc::new(config))
    }

    #[test]
    fn test_binding_resolves_profile_chain() {
        let creds = selector(sample_config())
            .credentials_for(Some(ServiceKind::Stk))
            .unwrap();
        assert_eq!(creds.consumer_key(), Some("default-key"));
        assert_eq!(creds.pass_key(), Some("lipa-passkey"));
        assert_eq!(creds.short_code(), Some("174379"));
    }

    #[test]
    fn test_binding_override_beats_profile() {
        let mut config = sample_config();
        config.services.insert(
            ServiceKind::C2b,
            ServiceBinding::to_profile("default").with_override("shortcode", "999"),
        );
        let creds = selector(config)
            .credentials_for(Some(ServiceKind::C2b))
            .unwrap();
        assert_eq!(creds.short_code(), Some("999"));
        assert_eq!(creds.consumer_key(), Some("default-key"));
    }

    #[test]
    fn test_legacy_entry_overlays_defaults() {
        let mut config = sample_config();
        config.services.remove(&ServiceKind::Balance);
        config.legacy_credentials.insert(
            ServiceKind::Balance,
            fields(&[("shortcode", "600111"), ("initiator", "legacy-op")]),
        );
        let sel = selector(config);
        assert_eq!(sel.source(ServiceKind::Balance), CredentialSource::Legacy);

        let creds = sel.credentials_for(Some(ServiceKind::Balance)).unwrap();
        assert_eq!(creds.short_code(), Some("600111"));
        assert_eq!(creds.initiator_name(), Some("legacy-op"));
        // Absent from the legacy entry: global default survives.
        assert_eq!(creds.consumer_key(), Some("global-key"));
        assert_eq!(creds.security_credential(), Some("global-credential"));
    }

    #[test]
    fn test_binding_ignores_legacy_entry() {
        let mut config = sample_config();
        config.legacy_credentials.insert(
            ServiceKind::Stk,
            fields(&[("shortcode", "000000"), ("initiator", "legacy-op")]),
        );
        let creds = selector(config)
            .credentials_for(Some(ServiceKind::Stk))
            .unwrap();
        assert_eq!(creds.short_code(), Some("174379"));
        assert_eq!(creds.get(CredentialField::InitiatorName), None);
    }

    #[test]
    fn test_unconfigured_service_uses_defaults() {
        let sel = selector(sample_config());
        assert_eq!(
            sel.source(ServiceKind::TransactionStatus),
            CredentialSource::Defaults
        );
        let creds = sel
            .credentials_for(Some(ServiceKind::TransactionStatus))
            .unwrap();
        assert_eq!(creds, sel.credentials_for(None).unwrap());
        assert_eq!(creds.consumer_key(), Some("global-key"));
    }

    #[test]
    fn test_binding_to_missing_profile_fails() {
        let mut config = sample_config();
        config
            .services
            .insert(ServiceKind::B2b, ServiceBinding::to_profile("nope"));
        let err = selector(config)
            .credentials_for(Some(ServiceKind::B2b))
            .unwrap_err();
        assert_eq!(err, ConfigError::ProfileNotFound("nope".into()));
    }

    #[test]
    fn test_binding_to_cyclic_profile_fails() {
        let mut config = sample_config();
        config.profiles.insert(
            "loop".into(),
            CredentialProfile::extending("loop", CredentialMap::new()),
        );
        config
            .services
            .insert(ServiceKind::B2b, ServiceBinding::to_profile("loop"));
        let err = selector(config)
            .credentials_for(Some(ServiceKind::B2b))
            .unwrap_err();
        assert!(matches!(err, ConfigError::CyclicProfile { .. }));
    }
}
