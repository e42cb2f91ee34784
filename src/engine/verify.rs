//! engine::verify
//!
//! Full verification: local validation, then the registry.
//!
//! # Behavior
//!
//! 1. Validate the code locally. A local failure is final and the registry
//!    is never contacted.
//! 2. Look the code up, bounded by `timeout`.
//! 3. On a service failure (error or timeout), retry up to `retries`
//!    more times.
//! 4. Map the answer onto a [`ValidationVerdict`]:
//!    - `Available` -> valid
//!    - `NotFound` -> `NotRegistered`
//!    - `AlreadyUsed` -> `AlreadyUsed`
//!    - exhausted retries -> `Service`
//!
//! Dropping the future returned by [`Verifier::verify`] abandons the
//! lookup and yields no verdict.
//!
//! # Example
//!
//! ```
//! use refcode::core::types::Identity;
//! use refcode::engine::Verifier;
//! use refcode::registry::mock::MemoryRegistry;
//!
//! # tokio_test::block_on(async {
//! let who = Identity::new("Asha Patel", "asha@example.com", "9876543210");
//! let code = refcode::generate(&who.name, &who.email, &who.phone);
//!
//! let verifier = Verifier::new(Box::new(MemoryRegistry::new()));
//! let outcome = verifier.verify(&code, &who).await;
//! assert!(!outcome.verdict.valid);
//! # });
//! ```

use std::time::Duration;

use serde::Serialize;

use crate::core::config::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS};
use crate::core::types::{Identity, ReferenceCode};
use crate::core::validator::{CodeValidator, ValidationError, ValidationVerdict};
use crate::registry::{Registry, RegistryError, RegistrySettings, RegistryStatus, Submission};

/// Result of a full verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Final verdict
    pub verdict: ValidationVerdict,
    /// Registry record, when the registry had one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
    /// Registry lookups attempted
    pub attempts: u32,
}

/// Result of a bounded, retried registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Registry answer, or the last service error once retries ran out
    pub result: Result<RegistryStatus, RegistryError>,
    /// Registry lookups attempted
    pub attempts: u32,
}

/// Runs local validation followed by a bounded registry lookup.
pub struct Verifier {
    validator: CodeValidator,
    registry: Box<dyn Registry>,
    timeout: Duration,
    retries: u32,
}

impl Verifier {
    /// Create a verifier with default timeout and retries.
    pub fn new(registry: Box<dyn Registry>) -> Self {
        Self {
            validator: CodeValidator::new(),
            registry,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Create a verifier using the timeout and retries from `settings`.
    pub fn from_settings(registry: Box<dyn Registry>, settings: &RegistrySettings) -> Self {
        Self::new(registry)
            .with_timeout(settings.timeout)
            .with_retries(settings.retries)
    }

    /// Use a custom validator (e.g., one with a fixed clock).
    pub fn with_validator(mut self, validator: CodeValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of extra attempts after a service failure.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Get the underlying registry.
    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    /// Verify `code` for `identity`.
    pub async fn verify(&self, code: &str, identity: &Identity) -> Verification {
        let local = self.validator.validate(code, identity);
        if !local.valid {
            return Verification {
                verdict: local,
                submission: None,
                attempts: 0,
            };
        }

        let parsed = match ReferenceCode::parse(code) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Verification {
                    verdict: ValidationVerdict::invalid(e),
                    submission: None,
                    attempts: 0,
                }
            }
        };

        let lookup = self.lookup(&parsed, identity).await;
        match lookup.result {
            Ok(status) => self.conclude(local, status, lookup.attempts),
            Err(e) => Verification {
                verdict: reject(local, ValidationError::Service(e.to_string())),
                submission: None,
                attempts: lookup.attempts,
            },
        }
    }

    /// Look `code` up with the timeout and retry policy, without local
    /// validation.
    ///
    /// Only service errors reach `result` as `Err`, and only after
    /// `retries` further attempts have also failed.
    pub async fn lookup(&self, code: &ReferenceCode, identity: &Identity) -> Lookup {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.attempt(code, identity).await {
                Ok(status) => {
                    return Lookup {
                        result: Ok(status),
                        attempts,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        code = %code,
                        registry = self.registry.name(),
                        attempt = attempts,
                        error = %e,
                        "registry lookup failed"
                    );
                    if attempts > self.retries {
                        return Lookup {
                            result: Err(e),
                            attempts,
                        };
                    }
                }
            }
        }
    }

    /// One lookup bounded by the timeout.
    async fn attempt(
        &self,
        code: &ReferenceCode,
        identity: &Identity,
    ) -> Result<RegistryStatus, RegistryError> {
        match tokio::time::timeout(self.timeout, self.registry.lookup(code, identity)).await {
            Ok(result) => result,
            Err(_) => Err(RegistryError::Timeout(self.timeout)),
        }
    }

    fn conclude(
        &self,
        local: ValidationVerdict,
        status: RegistryStatus,
        attempts: u32,
    ) -> Verification {
        tracing::debug!(registry = self.registry.name(), attempts, "registry answered");
        let (verdict, submission) = match status {
            RegistryStatus::Available(s) => (local, Some(s)),
            RegistryStatus::NotFound => (reject(local, ValidationError::NotRegistered), None),
            RegistryStatus::AlreadyUsed(s) => {
                (reject(local, ValidationError::AlreadyUsed), Some(s))
            }
        };
        Verification {
            verdict,
            submission,
            attempts,
        }
    }
}

/// Turn a passing local verdict into a failing one, keeping its details.
fn reject(local: ValidationVerdict, error: ValidationError) -> ValidationVerdict {
    ValidationVerdict {
        valid: false,
        error: Some(error),
        details: local.details,
    }
}
