//! # M-Pesa Core
//!
//! Credential resolution, token issuance, operation services and the
//! inbound webhook adapter.
//!
//! ## Architecture
//!
//! - `config` - builds the configuration from variables or a JSON file
//! - `profile` - expands single-parent profile inheritance
//! - `credentials` - picks binding, legacy or default credentials per service
//! - `validator` - required-field and callback checks per service
//! - `token` - bearer-token provider keyed by credential pair
//! - `operations/` - provider operations built on the pieces above
//! - `inbound/` - webhook receiver (Axum) republishing notifications
//!
//! Everything is generic over `T: MpesaTransport` and `C: TokenCache`, so the
//! HTTP client and cache adapters are injected at compile time.

pub mod config;
pub mod credentials;
pub mod inbound;
pub mod operations;
pub mod profile;
pub mod security;
pub mod token;
pub mod util;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use credentials::{CredentialSelector, CredentialSource};
pub use operations::{
    B2bService, B2cService, BalanceService, C2bService, Mpesa, OperationContext, ReversalService,
    StkService, TransactionStatusService,
};
pub use profile::ProfileResolver;
pub use token::TokenProvider;
pub use validator::ConfigValidator;
