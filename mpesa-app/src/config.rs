//! Configuration loading from environment.

use std::env;

use mpesa_types::MpesaConfig;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub mpesa: MpesaConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// `MPESA_CONFIG_FILE`, when set, points at a JSON document describing
    /// the full profile layout; otherwise the stock layout is built from
    /// `MPESA_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()?;

        let mpesa = match lookup("MPESA_CONFIG_FILE").filter(|p| !p.trim().is_empty()) {
            Some(path) => mpesa_core::config::from_json_file(&path)?,
            None => mpesa_core::config::from_lookup(&lookup)?,
        };

        Ok(Self { port, mpesa })
    }
}
