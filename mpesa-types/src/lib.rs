//! # M-Pesa Types
//!
//! Domain types and port traits for the M-Pesa SDK.
//! This crate has ZERO external IO dependencies - only data structures,
//! the configuration record, and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the **innermost core** of the hexagonal layout:
//! - `domain/` - Service kinds, credential profiles, bindings, webhook events
//! - `config` - The immutable configuration record consumed by the core
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto` - Provider request payloads
//! - `error` - Configuration, authentication and transport errors

pub mod config;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use config::{CacheConfig, CallbackConfig, Environment, LoggingConfig, MpesaConfig};
pub use domain::{
    CredentialField, CredentialMap, CredentialProfile, ResolvedCredentials, ServiceBinding,
    ServiceKind, ValidationResult, WebhookEvent, WebhookKind,
};
pub use dto::*;
pub use error::{AuthError, ConfigError, MpesaError, TransportError};
pub use ports::{MpesaTransport, TokenCache};
