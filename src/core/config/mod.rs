//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. An explicit path (the `--config` flag)
//! 2. `$NRL_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/nrl/config.toml`
//! 4. `~/.nrl/config.toml` (canonical write location)
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use refcode::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Expiry: {}h", config.expiry_hours());
//! println!("Registry: {}", config.registry_settings().unwrap().provider);
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RegistryConfig, CONFIG_KEYS};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::validator::DEFAULT_EXPIRY_HOURS;
use crate::registry::{RegistryEndpoint, RegistryProvider, RegistrySettings};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "NRL_CONFIG";

/// Default registry lookup timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Default number of retries after a service failure.
pub const DEFAULT_RETRIES: u32 = 1;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration.
///
/// Accessor methods apply defaults for anything not set in the file.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values from the config file
    pub global: GlobalConfig,
    /// Path the config was loaded from (if any)
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration, preferring `explicit` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. An explicit path that does not exist yet yields
    /// defaults, so `nrl --config new.toml config set ...` can create it.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Ok(Self::default());
            }
            let global = Self::read_config(path)?;
            return Ok(Self::from_parts(global, Some(path.to_path_buf())));
        }

        match Self::discover() {
            Some(path) => {
                let global = Self::read_config(&path)?;
                Ok(Self::from_parts(global, Some(path)))
            }
            None => Ok(Self::default()),
        }
    }

    /// Build a config from an in-memory value (no file).
    pub fn from_global(global: GlobalConfig) -> Result<Self, ConfigError> {
        global.validate()?;
        Ok(Self::from_parts(global, None))
    }

    fn from_parts(global: GlobalConfig, loaded_from: Option<PathBuf>) -> Self {
        Self {
            global,
            loaded_from,
        }
    }

    /// Find the first existing config file in the search order.
    fn discover() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("nrl/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        let canonical = dirs::home_dir()?.join(".nrl/config.toml");
        canonical.exists().then_some(canonical)
    }

    /// Read, parse, and validate a config file.
    fn read_config(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: GlobalConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the canonical config path, `~/.nrl/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".nrl/config.toml"))
    }

    /// Path that `nrl config set` writes to.
    ///
    /// The file the config was loaded from, else `$NRL_CONFIG`, else the
    /// canonical path.
    pub fn write_target(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.loaded_from {
            return Ok(path.clone());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        Self::canonical_path()
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory, then renames it over the target.
    pub fn write(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Expiry window in hours.
    ///
    /// Defaults to 24 if not configured.
    pub fn expiry_hours(&self) -> u64 {
        self.global.expiry_hours.unwrap_or(DEFAULT_EXPIRY_HOURS)
    }

    /// Whether to prompt for missing identity fields.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Resolve registry settings with defaults applied.
    ///
    /// The provider defaults to "file" at `~/.nrl/registry.json`.
    pub fn registry_settings(&self) -> Result<RegistrySettings, ConfigError> {
        let registry = self.global.registry.clone().unwrap_or_default();

        let provider = match registry.provider.as_deref() {
            Some(name) => RegistryProvider::parse(name).ok_or_else(|| {
                ConfigError::InvalidValue(format!("invalid registry provider '{}'", name))
            })?,
            None => RegistryProvider::File,
        };

        let endpoint = match registry.endpoint.as_deref() {
            Some(name) => RegistryEndpoint::parse(name).ok_or_else(|| {
                ConfigError::InvalidValue(format!("invalid registry endpoint '{}'", name))
            })?,
            None => RegistryEndpoint::default(),
        };

        let path = match registry.path {
            Some(path) => path,
            None if provider == RegistryProvider::File => Self::default_registry_path()?,
            None => PathBuf::new(),
        };

        Ok(RegistrySettings {
            provider,
            path,
            base_url: registry.base_url,
            endpoint,
            timeout: Duration::from_millis(registry.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)),
            retries: registry.retries.unwrap_or(DEFAULT_RETRIES),
        })
    }

    /// Default registry file, `~/.nrl/registry.json`.
    pub fn default_registry_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".nrl/registry.json"))
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
