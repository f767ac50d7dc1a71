//! Profile inheritance.
//!
//! A profile's effective fields are its parent's effective fields overlaid
//! by its own (child wins). Chains that revisit a profile are rejected.

use std::collections::BTreeMap;

use mpesa_types::{ConfigError, CredentialMap, CredentialProfile};

/// Resolves named profiles against an immutable profile table.
#[derive(Debug, Clone, Copy)]
pub struct ProfileResolver<'a> {
    profiles: &'a BTreeMap<String, CredentialProfile>,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(profiles: &'a BTreeMap<String, CredentialProfile>) -> Self {
        Self { profiles }
    }

    /// Returns the effective flat credential mapping for `name`.
    pub fn resolve(&self, name: &str) -> Result<CredentialMap, ConfigError> {
        let mut chain = Vec::new();
        self.resolve_chain(name, &mut chain)
    }

    fn resolve_chain(
        &self,
        name: &str,
        chain: &mut Vec<String>,
    ) -> Result<CredentialMap, ConfigError> {
        if chain.iter().any(|visited| visited == name) {
            chain.push(name.to_string());
            return Err(ConfigError::CyclicProfile {
                chain: std::mem::take(chain),
            });
        }

        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;
        chain.push(name.to_string());

        let mut effective = match &profile.extends {
            Some(parent) => self.resolve_chain(parent, chain)?,
            None => CredentialMap::new(),
        };
        effective.extend(
            profile
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Ok(effective)
    }
}
