//! Request helpers: phone normalization, timestamps, references, log masking.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rand::Rng;
use serde_json::Value;

/// East Africa Time, the provider's clock.
const EAT_OFFSET_SECS: i32 = 3 * 3600;

const MASKED_KEYS: &[&str] = &["Password", "SecurityCredential", "CommandID"];

/// Normalizes a Kenyan phone number to `2547XXXXXXXX` form.
///
/// Non-digits are dropped; a leading `0` or a bare 9-digit subscriber
/// number gets the `254` country code. Anything else is returned as digits.
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if let Some(rest) = digits.strip_prefix('0') {
        return format!("254{}", rest);
    }
    if digits.starts_with("254") {
        return digits;
    }
    if digits.len() == 9 {
        return format!("254{}", digits);
    }
    digits
}

/// True for numbers that normalize to `254` + `7`/`1` + 8 digits.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let formatted = format_phone_number(phone);
    formatted.len() == 12
        && formatted.starts_with("254")
        && matches!(formatted.as_bytes()[3], b'7' | b'1')
}

/// Current provider timestamp, `YYYYMMDDHHmmss` in East Africa Time.
pub fn generate_timestamp() -> String {
    let now = Utc::now();
    match FixedOffset::east_opt(EAT_OFFSET_SECS) {
        Some(eat) => format_timestamp(&now.with_timezone(&eat)),
        None => format_timestamp(&now),
    }
}

pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y%m%d%H%M%S").to_string()
}

/// A loosely unique reference: prefix, unix seconds, four random digits.
pub fn generate_reference(prefix: &str) -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("{}{}{}", prefix, Utc::now().timestamp(), suffix)
}

/// Copy of a request payload with credential-bearing fields masked for logs.
pub fn mask_sensitive(payload: &Value) -> Value {
    let mut masked = payload.clone();
    if let Value::Object(map) = &mut masked {
        for key in MASKED_KEYS {
            if let Some(value) = map.get_mut(*key) {
                *value = Value::String("***MASKED***".into());
            }
        }
    }
    masked
}
