//! Resolver configuration
//!
//! The only tunable is the identity domain appended to namespace-qualified
//! service names. It can be decoded from JSON or read from the environment;
//! environment access goes through [`EnvConfig`] so tests never touch
//! process-global state.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{Error, Result, DEFAULT_IDENTITY_DOMAIN, IDENTITY_DOMAIN_ENV};

/// Configuration for host resolution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    /// Identity domain for objects that do not name their cluster
    #[serde(default = "default_identity_domain")]
    pub identity_domain: String,
}

fn default_identity_domain() -> String {
    DEFAULT_IDENTITY_DOMAIN.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            identity_domain: default_identity_domain(),
        }
    }
}

impl ResolverConfig {
    /// Decode and validate a JSON configuration document
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            warn!(error = %e, "failed to decode resolver config");
            Error::serialization_for_kind("ResolverConfig", e.to_string())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from the environment, falling back to defaults
    pub fn from_env(env: &dyn EnvConfig) -> Result<Self> {
        let config = match env.identity_domain() {
            Some(identity_domain) => Self { identity_domain },
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the identity domain is usable as a DNS suffix
    pub fn validate(&self) -> Result<()> {
        self.check_identity_domain().map_err(|e| {
            warn!(identity_domain = %self.identity_domain, error = %e, "invalid resolver config");
            e
        })
    }

    fn check_identity_domain(&self) -> Result<()> {
        let domain = &self.identity_domain;
        if domain.is_empty() {
            return Err(Error::validation_for_field(
                "identityDomain",
                "must not be empty",
            ));
        }
        if domain.starts_with('.') || domain.ends_with('.') {
            return Err(Error::validation_for_field(
                "identityDomain",
                format!("'{}' must not start or end with a dot", domain),
            ));
        }
        if domain.chars().any(char::is_whitespace) {
            return Err(Error::validation_for_field(
                "identityDomain",
                format!("'{}' must not contain whitespace", domain),
            ));
        }
        Ok(())
    }
}

/// Trait for reading resolver settings from the environment
#[cfg_attr(test, mockall::automock)]
pub trait EnvConfig: Send + Sync {
    /// Identity domain override, if set
    fn identity_domain(&self) -> Option<String>;
}

/// Default implementation that reads from environment variables
#[derive(Clone, Default)]
pub struct OsEnvConfig;

impl EnvConfig for OsEnvConfig {
    fn identity_domain(&self) -> Option<String> {
        std::env::var(IDENTITY_DOMAIN_ENV)
            .ok()
            .filter(|value| !value.is_empty())
    }
}
