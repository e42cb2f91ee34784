//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Location
//!
//! Searched in order:
//! 1. `--config <path>` if given
//! 2. `$NRL_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/nrl/config.toml`
//! 4. `~/.nrl/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing, so a bad provider name or a
//! zero timeout is reported at load time rather than on first use.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::registry::{RegistryEndpoint, RegistryProvider};

/// Keys accepted by `nrl config get/set`.
pub const CONFIG_KEYS: &[&str] = &[
    "expiry_hours",
    "interactive",
    "registry.provider",
    "registry.path",
    "registry.base_url",
    "registry.endpoint",
    "registry.timeout_ms",
    "registry.retries",
];

/// Top-level configuration.
///
/// # Example
///
/// ```toml
/// expiry_hours = 24
/// interactive = true
///
/// [registry]
/// provider = "http"
/// base_url = "https://api.example.org/api"
/// endpoint = "forms"
/// timeout_ms = 5000
/// retries = 1
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Expiry window used by `inspect` and `check`, in hours
    pub expiry_hours: Option<u64>,

    /// Prompt for missing identity fields
    pub interactive: Option<bool>,

    /// Registry settings
    pub registry: Option<RegistryConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(registry) = &self.registry {
            registry.validate()?;
        }
        Ok(())
    }

    /// Read a value by dotted key.
    ///
    /// Returns `Ok(None)` for a known key with no value set.
    pub fn get_key(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let registry = self.registry.as_ref();
        let value = match key {
            "expiry_hours" => self.expiry_hours.map(|v| v.to_string()),
            "interactive" => self.interactive.map(|v| v.to_string()),
            "registry.provider" => registry.and_then(|r| r.provider.clone()),
            "registry.path" => registry
                .and_then(|r| r.path.as_ref())
                .map(|p| p.display().to_string()),
            "registry.base_url" => registry.and_then(|r| r.base_url.clone()),
            "registry.endpoint" => registry.and_then(|r| r.endpoint.clone()),
            "registry.timeout_ms" => registry.and_then(|r| r.timeout_ms).map(|v| v.to_string()),
            "registry.retries" => registry.and_then(|r| r.retries).map(|v| v.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by dotted key, then re-validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for unknown keys, unparseable
    /// values, or values that fail validation.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "expiry_hours" => self.expiry_hours = Some(parse_value(key, value)?),
            "interactive" => self.interactive = Some(parse_value(key, value)?),
            _ => {
                let Some(field) = key.strip_prefix("registry.") else {
                    return Err(unknown_key(key));
                };
                let registry = self.registry.get_or_insert_with(RegistryConfig::default);
                match field {
                    "provider" => registry.provider = Some(value.to_string()),
                    "path" => registry.path = Some(PathBuf::from(value)),
                    "base_url" => registry.base_url = Some(value.to_string()),
                    "endpoint" => registry.endpoint = Some(value.to_string()),
                    "timeout_ms" => registry.timeout_ms = Some(parse_value(key, value)?),
                    "retries" => registry.retries = Some(parse_value(key, value)?),
                    _ => return Err(unknown_key(key)),
                }
            }
        }
        self.validate()
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::InvalidValue(format!(
        "unknown configuration key '{}', must be one of: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("invalid value for {}: {}", key, e)))
}

/// Registry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Provider to use ("memory", "file", "http", or "none")
    pub provider: Option<String>,

    /// Registry file for the "file" provider
    pub path: Option<PathBuf>,

    /// Base URL for the "http" provider
    pub base_url: Option<String>,

    /// Remote endpoint for the "http" provider ("reference" or "forms")
    pub endpoint: Option<String>,

    /// Lookup timeout in milliseconds
    pub timeout_ms: Option<u64>,

    /// Extra attempts after a service failure
    pub retries: Option<u32>,
}

impl RegistryConfig {
    /// Validate the registry configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let provider = match &self.provider {
            Some(name) => Some(RegistryProvider::parse(name).ok_or_else(|| {
                ConfigError::InvalidValue(format!(
                    "invalid registry provider '{}', must be one of: {}",
                    name,
                    crate::registry::valid_provider_names().join(", ")
                ))
            })?),
            None => None,
        };

        if let Some(endpoint) = &self.endpoint {
            if RegistryEndpoint::parse(endpoint).is_none() {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid registry endpoint '{}', must be 'reference' or 'forms'",
                    endpoint
                )));
            }
        }

        if provider == Some(RegistryProvider::Http)
            && self.base_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::InvalidValue(
                "registry provider 'http' requires registry.base_url".to_string(),
            ));
        }

        if self.timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue(
                "registry.timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
