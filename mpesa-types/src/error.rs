//! Error types for the M-Pesa SDK.

use crate::domain::{CredentialField, ServiceKind};

/// Configuration errors (resolution and validation).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Profile '{0}' not found in configuration")]
    ProfileNotFound(String),

    #[error("Cyclic profile inheritance: {}", .chain.join(" -> "))]
    CyclicProfile { chain: Vec<String> },

    #[error("Missing required configuration: {0}")]
    MissingField(CredentialField),

    #[error("No callback URL configured for service: {0}")]
    MissingCallbackUrl(ServiceKind),

    #[error("Configuration for {service} is incomplete: {}", join_errors(.errors))]
    Incomplete {
        service: ServiceKind,
        errors: Vec<ConfigError>,
    },

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Token-issuance failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to generate access token: {status} - {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response from authentication endpoint: {0}")]
    InvalidResponse(String),
}

/// Transport-level failures reported by the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("M-Pesa API request failed: {status} - {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Application-level errors returned by the operation services.
#[derive(Debug, thiserror::Error)]
pub enum MpesaError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation is only available in the sandbox environment")]
    SandboxOnly,
}
