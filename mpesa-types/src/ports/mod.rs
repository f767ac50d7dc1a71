//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The core depends on these traits, not on concrete HTTP or cache clients.

mod cache;
mod transport;

pub use cache::TokenCache;
pub use transport::MpesaTransport;
