//! Domain models for the M-Pesa SDK.

pub mod credentials;
pub mod profile;
pub mod service;
pub mod validation;
pub mod webhook;

pub use credentials::{CredentialField, CredentialMap, ResolvedCredentials};
pub use profile::{CredentialProfile, ServiceBinding};
pub use service::ServiceKind;
pub use validation::ValidationResult;
pub use webhook::{WebhookEvent, WebhookKind};
