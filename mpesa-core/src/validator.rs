//! Per-service configuration validation.
//!
//! Collects every problem instead of stopping at the first one.

use mpesa_types::{
    CallbackConfig, ConfigError, CredentialField, ResolvedCredentials, ServiceKind,
    ValidationResult,
};

use crate::credentials::CredentialSelector;

const BASE_FIELDS: &[CredentialField] = &[
    CredentialField::ConsumerKey,
    CredentialField::ConsumerSecret,
    CredentialField::ShortCode,
];

const PUSH_FIELDS: &[CredentialField] = &[
    CredentialField::ConsumerKey,
    CredentialField::ConsumerSecret,
    CredentialField::ShortCode,
    CredentialField::PassKey,
];

const INITIATOR_FIELDS: &[CredentialField] = &[
    CredentialField::ConsumerKey,
    CredentialField::ConsumerSecret,
    CredentialField::ShortCode,
    CredentialField::InitiatorName,
    CredentialField::SecurityCredential,
];

/// Credential fields a service cannot run without.
pub fn required_fields(service: ServiceKind) -> &'static [CredentialField] {
    match service {
        ServiceKind::Stk => PUSH_FIELDS,
        ServiceKind::C2b | ServiceKind::TransactionStatus => BASE_FIELDS,
        ServiceKind::B2c
        | ServiceKind::B2b
        | ServiceKind::Balance
        | ServiceKind::Reversal
        | ServiceKind::Withdrawal => INITIATOR_FIELDS,
    }
}

/// Checks resolved credentials and callback availability for a service.
#[derive(Debug, Clone)]
pub struct ConfigValidator {
    selector: CredentialSelector,
}

impl ConfigValidator {
    pub fn new(selector: CredentialSelector) -> Self {
        Self { selector }
    }

    /// Validates `service`. Resolution failures (unknown or cyclic profiles)
    /// are returned as errors, not folded into the result.
    pub fn validate(&self, service: ServiceKind) -> Result<ValidationResult, ConfigError> {
        self.inspect(service).map(|(_, result)| result)
    }

    /// Validates `service` and hands back the credentials that were checked.
    pub fn inspect(
        &self,
        service: ServiceKind,
    ) -> Result<(ResolvedCredentials, ValidationResult), ConfigError> {
        let credentials = self.selector.credentials_for(Some(service))?;
        let result = check(
            service,
            &credentials,
            &self.selector.config().callbacks,
        );
        Ok((credentials, result))
    }

    /// Validates every service kind.
    pub fn validate_all(&self) -> Vec<(ServiceKind, Result<ValidationResult, ConfigError>)> {
        ServiceKind::all()
            .iter()
            .map(|&service| (service, self.validate(service)))
            .collect()
    }
}

fn check(
    service: ServiceKind,
    credentials: &ResolvedCredentials,
    callbacks: &CallbackConfig,
) -> ValidationResult {
    let mut errors: Vec<ConfigError> = required_fields(service)
        .iter()
        .filter(|field| credentials.get(**field).is_none())
        .map(|field| ConfigError::MissingField(*field))
        .collect();

    if callbacks.url_for(service).is_none() {
        errors.push(ConfigError::MissingCallbackUrl(service));
    }

    ValidationResult::new(service, errors)
}
