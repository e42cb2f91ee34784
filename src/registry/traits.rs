//! registry::traits
//!
//! Registry trait and the types it exchanges.
//!
//! # Design
//!
//! The `Registry` trait is async because real registries sit behind a
//! network or a filesystem. It has a single lookup method; mutation
//! (recording and consuming codes) belongs to the concrete stores that
//! support it.
//!
//! A lookup runs only after local validation has passed, so every
//! implementation may assume the code is structurally sound.
//!
//! # Example
//!
//! ```ignore
//! use refcode::registry::{Registry, RegistryStatus};
//!
//! async fn is_payable(registry: &dyn Registry, code: &ReferenceCode, who: &Identity) -> bool {
//!     matches!(registry.lookup(code, who).await, Ok(RegistryStatus::Available(_)))
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{Identity, ReferenceCode};

/// Errors from registry operations.
///
/// Every variant is a service failure: the registry could not give an
/// answer. "Not found" and "already used" are answers and live in
/// [`RegistryStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Transport failure or no registry configured.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The lookup did not finish in time.
    #[error("registry lookup timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The remote registry returned a non-success status.
    #[error("registry API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The local registry file could not be read, written, or locked.
    #[error("registry storage error: {0}")]
    Storage(String),
}

/// Processing state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Recorded, awaiting validation
    #[default]
    Pending,
    /// Validated at least once
    Validated,
    /// Consumed for payment
    Processed,
}

impl SubmissionStatus {
    /// Parse a status from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Some(SubmissionStatus::Pending),
            "validated" => Some(SubmissionStatus::Validated),
            "processed" => Some(SubmissionStatus::Processed),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Pending => write!(f, "pending"),
            SubmissionStatus::Validated => write!(f, "validated"),
            SubmissionStatus::Processed => write!(f, "processed"),
        }
    }
}

/// A registered reference code and its external form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// The reference code
    pub code: ReferenceCode,
    /// Identifier of the external form submission
    pub form_id: String,
    /// When the submission was received
    pub submission_time: DateTime<Utc>,
    /// Processing state
    pub status: SubmissionStatus,
}

impl Submission {
    /// A new pending submission with a generated form id.
    pub fn pending(code: ReferenceCode, submission_time: DateTime<Utc>) -> Self {
        Self {
            code,
            form_id: new_form_id(),
            submission_time,
            status: SubmissionStatus::Pending,
        }
    }

    /// Whether this submission has been consumed.
    pub fn is_processed(&self) -> bool {
        self.status == SubmissionStatus::Processed
    }
}

/// Generate a form id for submissions recorded without one.
pub fn new_form_id() -> String {
    format!("form_{}", uuid::Uuid::new_v4().simple())
}

/// Outcome of a registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryStatus {
    /// Registered and not yet consumed.
    Available(Submission),
    /// Not in the registry.
    NotFound,
    /// Registered but already consumed.
    AlreadyUsed(Submission),
}

impl RegistryStatus {
    /// Classify a found submission by its status.
    pub fn from_submission(submission: Submission) -> Self {
        if submission.is_processed() {
            RegistryStatus::AlreadyUsed(submission)
        } else {
            RegistryStatus::Available(submission)
        }
    }

    /// The submission, if the code is registered.
    pub fn submission(&self) -> Option<&Submission> {
        match self {
            RegistryStatus::Available(s) | RegistryStatus::AlreadyUsed(s) => Some(s),
            RegistryStatus::NotFound => None,
        }
    }
}

/// A store of accepted reference codes.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single registry can serve
/// concurrent verifications.
///
/// # Error Handling
///
/// `Err` means no answer was obtained. Callers report it as "try again"
/// and never as an invalid code.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Get the registry name (e.g., "file", "http").
    fn name(&self) -> &'static str;

    /// Look up `code` on behalf of `identity`.
    ///
    /// Stores that do not bind codes to identities ignore `identity`.
    async fn lookup(
        &self,
        code: &ReferenceCode,
        identity: &Identity,
    ) -> Result<RegistryStatus, RegistryError>;
}
