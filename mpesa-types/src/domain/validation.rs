//! Configuration validation outcome.

use super::{CredentialField, ServiceKind};
use crate::error::ConfigError;

/// Every problem found while validating one service's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub service: ServiceKind,
    pub errors: Vec<ConfigError>,
}

impl ValidationResult {
    pub fn new(service: ServiceKind, errors: Vec<ConfigError>) -> Self {
        Self { service, errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Required credential fields that were missing or blank, in check order.
    pub fn missing_fields(&self) -> Vec<CredentialField> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::MissingField(field) => Some(*field),
                _ => None,
            })
            .collect()
    }

    pub fn missing_callback_url(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, ConfigError::MissingCallbackUrl(_)))
    }

    /// Converts into a pre-flight guard result.
    pub fn into_result(self) -> Result<(), ConfigError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ConfigError::Incomplete {
                service: self.service,
                errors: self.errors,
            })
        }
    }
}
