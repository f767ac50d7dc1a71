//! Configuration loading.
//!
//! Environment-style variables produce the stock profile layout; a JSON
//! document can describe any layout. Either way the result is built once
//! and handed to the components as an `Arc<MpesaConfig>`.

use std::path::Path;

use tracing::debug;

use mpesa_types::{
    CacheConfig, CallbackConfig, ConfigError, CredentialField, CredentialMap, CredentialProfile,
    Environment, LoggingConfig, MpesaConfig, ServiceBinding, ServiceKind,
};

const DEFAULT_PROFILE: &str = "default";
const PUSH_PROFILE: &str = "lipa_na_mpesa";
const BUSINESS_PROFILE: &str = "business_operations";
const WITHDRAWAL_PROFILE: &str = "withdrawal";

const DEFAULT_STK_TYPE: &str = "CustomerPayBillOnline";

/// Variable name per credential field.
fn credential_var(prefix: &str, field: CredentialField) -> String {
    let name = match field {
        CredentialField::ConsumerKey => "CONSUMER_KEY",
        CredentialField::ConsumerSecret => "CONSUMER_SECRET",
        CredentialField::ShortCode => "SHORTCODE",
        CredentialField::PassKey => "PASSKEY",
        CredentialField::InitiatorName => "INITIATOR_NAME",
        CredentialField::SecurityCredential => "SECURITY_CREDENTIAL",
    };
    format!("{}{}", prefix, name)
}

/// Builds the stock layout from environment-style variables.
///
/// Unset and blank variables are treated as absent, so missing credentials
/// surface later as validation errors rather than empty strings.
pub fn from_lookup<F>(lookup: F) -> Result<MpesaConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let collect = |prefix: &str, wanted: &[CredentialField]| -> CredentialMap {
        wanted
            .iter()
            .filter_map(|&field| {
                var(&credential_var(prefix, field)).map(|v| (field.key().to_string(), v))
            })
            .collect()
    };

    let mut config = MpesaConfig {
        default_credentials: collect("MPESA_", CredentialField::all()),
        ..Default::default()
    };

    if let Some(env) = var("MPESA_ENV") {
        config.environment = env.parse::<Environment>().map_err(ConfigError::Load)?;
    }

    use CredentialField::*;
    config.profiles.insert(
        DEFAULT_PROFILE.into(),
        CredentialProfile::new(collect("MPESA_", &[ConsumerKey, ConsumerSecret, ShortCode])),
    );
    config.profiles.insert(
        PUSH_PROFILE.into(),
        CredentialProfile::extending(DEFAULT_PROFILE, collect("MPESA_", &[PassKey])),
    );
    config.profiles.insert(
        BUSINESS_PROFILE.into(),
        CredentialProfile::extending(
            DEFAULT_PROFILE,
            collect("MPESA_", &[InitiatorName, SecurityCredential]),
        ),
    );
    config.profiles.insert(
        WITHDRAWAL_PROFILE.into(),
        CredentialProfile::new(collect(
            "MPESA_W_",
            &[
                ConsumerKey,
                ConsumerSecret,
                ShortCode,
                InitiatorName,
                SecurityCredential,
            ],
        )),
    );

    let stk_type = var("MPESA_STK_PUSH_TYPE").unwrap_or_else(|| DEFAULT_STK_TYPE.to_string());
    config.services.insert(
        ServiceKind::Stk,
        ServiceBinding::to_profile(PUSH_PROFILE).with_setting("type", stk_type),
    );
    config
        .services
        .insert(ServiceKind::C2b, ServiceBinding::to_profile(DEFAULT_PROFILE));
    for service in [
        ServiceKind::B2c,
        ServiceKind::B2b,
        ServiceKind::Balance,
        ServiceKind::Reversal,
    ] {
        config
            .services
            .insert(service, ServiceBinding::to_profile(BUSINESS_PROFILE));
    }
    config.services.insert(
        ServiceKind::Withdrawal,
        ServiceBinding::to_profile(WITHDRAWAL_PROFILE),
    );

    config.callbacks = CallbackConfig {
        base_url: var("MPESA_CALLBACK_URL"),
        per_service: ServiceKind::all()
            .iter()
            .filter_map(|&service| {
                let name = format!(
                    "MPESA_{}_CALLBACK_URL",
                    service.as_str().to_ascii_uppercase()
                );
                var(&name).map(|url| (service, url))
            })
            .collect(),
    };

    let defaults = CacheConfig::default();
    config.cache = CacheConfig {
        key_prefix: var("MPESA_CACHE_PREFIX").unwrap_or(defaults.key_prefix),
        ttl_seconds: parse_number(var("MPESA_CACHE_TTL"), "MPESA_CACHE_TTL")?
            .unwrap_or(defaults.ttl_seconds),
    };
    if let Some(timeout) = parse_number(var("MPESA_TIMEOUT"), "MPESA_TIMEOUT")? {
        config.timeout_seconds = timeout;
    }
    if let Some(logging) = var("MPESA_LOGGING") {
        config.logging = LoggingConfig {
            enabled: parse_flag(&logging),
        };
    }

    debug!(environment = %config.environment, "Loaded configuration from variables");
    Ok(config)
}

/// [`from_lookup`] over the process environment.
pub fn from_env() -> Result<MpesaConfig, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

pub fn from_json_str(json: &str) -> Result<MpesaConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

pub fn from_json_file(path: impl AsRef<Path>) -> Result<MpesaConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    let config = from_json_str(&contents)?;
    debug!(path = %path.display(), "Loaded configuration file");
    Ok(config)
}

fn parse_number(value: Option<String>, name: &str) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Load(format!("{} must be a number, got '{}'", name, v)))
        })
        .transpose()
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
