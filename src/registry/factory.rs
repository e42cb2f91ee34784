//! registry::factory
//!
//! Registry selection and creation.
//!
//! # Design
//!
//! Commands call [`create_registry`] with resolved settings instead of
//! constructing concrete registries, so the choice of backend lives in
//! configuration alone.

#![warn(missing_docs)]

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use super::file_store::FileRegistry;
use super::http::HttpRegistry;
use super::mock::MemoryRegistry;
use super::traits::{Registry, RegistryError, RegistryStatus};
use crate::core::types::{Identity, ReferenceCode};

/// Supported registry providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryProvider {
    /// Process-local map, empty at start
    Memory,
    /// JSON file on disk
    File,
    /// Remote backend over HTTP
    Http,
    /// No registry; every lookup is unavailable
    None,
}

impl RegistryProvider {
    /// Get all providers.
    pub fn all() -> &'static [RegistryProvider] {
        &[
            RegistryProvider::Memory,
            RegistryProvider::File,
            RegistryProvider::Http,
            RegistryProvider::None,
        ]
    }

    /// Get the provider name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryProvider::Memory => "memory",
            RegistryProvider::File => "file",
            RegistryProvider::Http => "http",
            RegistryProvider::None => "none",
        }
    }

    /// Parse a provider from a string.
    ///
    /// # Example
    ///
    /// ```
    /// use refcode::registry::RegistryProvider;
    ///
    /// assert_eq!(RegistryProvider::parse("HTTP"), Some(RegistryProvider::Http));
    /// assert_eq!(RegistryProvider::parse("sheets"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for RegistryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Remote endpoint used by the HTTP provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistryEndpoint {
    /// `POST /validate-reference`, code only
    #[default]
    Reference,
    /// `POST /validate-google-forms`, code plus identity
    Forms,
}

impl RegistryEndpoint {
    /// Parse an endpoint mode from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reference" => Some(RegistryEndpoint::Reference),
            "forms" => Some(RegistryEndpoint::Forms),
            _ => None,
        }
    }

    /// URL path segment for this endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            RegistryEndpoint::Reference => "validate-reference",
            RegistryEndpoint::Forms => "validate-google-forms",
        }
    }
}

impl std::fmt::Display for RegistryEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEndpoint::Reference => write!(f, "reference"),
            RegistryEndpoint::Forms => write!(f, "forms"),
        }
    }
}

/// Registry settings with defaults applied.
///
/// Built by [`crate::core::config::Config::registry_settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrySettings {
    /// Which registry backend to build
    pub provider: RegistryProvider,
    /// Registry file (file provider only)
    pub path: PathBuf,
    /// Backend base URL (http provider only)
    pub base_url: Option<String>,
    /// Backend route to call (http provider only)
    pub endpoint: RegistryEndpoint,
    /// Upper bound on a single lookup
    pub timeout: Duration,
    /// Extra attempts after a service failure
    pub retries: u32,
}

/// Registry used when `provider = "none"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

#[async_trait]
impl Registry for NoRegistry {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn lookup(
        &self,
        _code: &ReferenceCode,
        _identity: &Identity,
    ) -> Result<RegistryStatus, RegistryError> {
        Err(RegistryError::Unavailable("no registry configured".into()))
    }
}

/// Create the registry described by `settings`.
///
/// # Errors
///
/// Returns `RegistryError::Unavailable` if the http provider has no base URL.
pub fn create_registry(settings: &RegistrySettings) -> Result<Box<dyn Registry>, RegistryError> {
    tracing::debug!(provider = %settings.provider, "creating registry");
    Ok(match settings.provider {
        RegistryProvider::Memory => Box::new(MemoryRegistry::new()),
        RegistryProvider::File => Box::new(FileRegistry::with_path(settings.path.clone())),
        RegistryProvider::Http => {
            let base_url = settings.base_url.as_deref().ok_or_else(|| {
                RegistryError::Unavailable("http registry requires a base URL".into())
            })?;
            Box::new(HttpRegistry::new(base_url, settings.endpoint))
        }
        RegistryProvider::None => Box::new(NoRegistry),
    })
}

/// Get the list of valid provider names for configuration validation.
pub fn valid_provider_names() -> Vec<&'static str> {
    RegistryProvider::all().iter().map(|p| p.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: RegistryProvider) -> RegistrySettings {
        RegistrySettings {
            provider,
            path: PathBuf::from("/tmp/nrl-registry.json"),
            base_url: None,
            endpoint: RegistryEndpoint::Reference,
            timeout: Duration::from_secs(5),
            retries: 1,
        }
    }

    mod registry_provider {
        use super::*;

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!(RegistryProvider::parse("file"), Some(RegistryProvider::File));
            assert_eq!(RegistryProvider::parse("Memory"), Some(RegistryProvider::Memory));
            assert_eq!(RegistryProvider::parse("NONE"), Some(RegistryProvider::None));
            assert_eq!(RegistryProvider::parse(""), None);
        }

        #[test]
        fn names_roundtrip() {
            for provider in RegistryProvider::all() {
                assert_eq!(RegistryProvider::parse(&provider.to_string()), Some(*provider));
            }
            assert_eq!(valid_provider_names(), vec!["memory", "file", "http", "none"]);
        }
    }

    mod registry_endpoint {
        use super::*;

        #[test]
        fn parse_and_path() {
            assert_eq!(RegistryEndpoint::parse("forms"), Some(RegistryEndpoint::Forms));
            assert_eq!(RegistryEndpoint::parse("Reference"), Some(RegistryEndpoint::Reference));
            assert_eq!(RegistryEndpoint::parse("sheets"), None);
            assert_eq!(RegistryEndpoint::Forms.path(), "validate-google-forms");
            assert_eq!(RegistryEndpoint::default(), RegistryEndpoint::Reference);
        }
    }

    mod create_registry {
        use super::*;

        #[test]
        fn each_provider() {
            for (provider, name) in [
                (RegistryProvider::Memory, "memory"),
                (RegistryProvider::File, "file"),
                (RegistryProvider::None, "none"),
            ] {
                assert_eq!(create_registry(&settings(provider)).unwrap().name(), name);
            }

            let mut http = settings(RegistryProvider::Http);
            http.base_url = Some("https://api.example.org".into());
            assert_eq!(create_registry(&http).unwrap().name(), "http");
        }

        #[test]
        fn http_without_base_url_fails() {
            let result = create_registry(&settings(RegistryProvider::Http));
            assert!(matches!(result, Err(RegistryError::Unavailable(_))));
        }

        #[tokio::test]
        async fn none_is_always_unavailable() {
            let registry = create_registry(&settings(RegistryProvider::None)).unwrap();
            let code = ReferenceCode::parse("NRL0ABCDEFGHIJKL042").unwrap();
            let result = registry.lookup(&code, &Identity::default()).await;
            assert_eq!(
                result,
                Err(RegistryError::Unavailable("no registry configured".into()))
            );
        }
    }
}
