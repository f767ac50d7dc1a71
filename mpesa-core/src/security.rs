//! Credential encoding and fingerprinting.

use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};

/// Stable fingerprint of a consumer key/secret pair (hex SHA-256).
pub fn credential_fingerprint(consumer_key: &str, consumer_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(consumer_key.as_bytes());
    hasher.update(b":");
    hasher.update(consumer_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Basic-auth credential for token issuance: base64 of `key:secret`.
pub fn basic_credential(consumer_key: &str, consumer_secret: &str) -> String {
    STANDARD.encode(format!("{}:{}", consumer_key, consumer_secret))
}

/// Push-payment password: base64 of shortcode, passkey and timestamp.
pub fn generate_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{}{}{}", shortcode, passkey, timestamp))
}
