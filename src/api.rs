//! api
//!
//! Wire types and handler logic for the validation backend.
//!
//! # Endpoints
//!
//! - `POST /validate-reference`: `{ referenceCode, timestamp }`. No
//!   identity is sent, so only the structural check runs locally before
//!   the registry is consulted.
//! - `POST /validate-google-forms`: `{ referenceCode, userDetails,
//!   timestamp }`. Full local validation against `userDetails`, then the
//!   registry.
//!
//! Both answer `{ success, message, outcome, data? }` with the HTTP status
//! given by [`ValidationResponse::http_status`]. The handlers never fail:
//! every outcome, including an unreachable registry, becomes a response.
//! Registry lookups go through a [`Verifier`], so they are bounded by its
//! timeout and retried on service errors.
//!
//! `outcome` is what clients branch on. `message` is for people, and a
//! `success: false` body can mean anything from "not registered" to "try
//! again later".
//!
//! The same types are used by [`crate::registry::HttpRegistry`] on the
//! client side.
//!
//! # Example
//!
//! ```
//! use refcode::api::{handle_validate_google_forms, ValidateGoogleFormsRequest};
//! use refcode::core::types::Identity;
//! use refcode::api::Outcome;
//! use refcode::engine::Verifier;
//! use refcode::registry::mock::MemoryRegistry;
//!
//! # tokio_test::block_on(async {
//! let who = Identity::new("Asha Patel", "asha@example.com", "9876543210");
//! let code = refcode::generate(&who.name, &who.email, &who.phone);
//!
//! let verifier = Verifier::new(Box::new(MemoryRegistry::new()));
//! let request = ValidateGoogleFormsRequest::new(code, who);
//! let response = handle_validate_google_forms(&verifier, &request).await;
//! assert!(!response.success);
//! assert_eq!(response.outcome, Some(Outcome::NotFound));
//! assert_eq!(response.message, "Reference code not found in registration system");
//! # });
//! ```

#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{Identity, ReferenceCode};
use crate::core::validator::ValidationError;
use crate::engine::Verifier;
use crate::registry::{RegistryStatus, Submission, SubmissionStatus};

/// Message for a code the registry accepted.
pub const MSG_VALIDATED: &str = "Reference code validated successfully";
/// Message for a code the registry has never seen.
pub const MSG_NOT_FOUND: &str = "Reference code not found in registration system";
/// Message for a code whose submission was already processed.
pub const MSG_ALREADY_USED: &str = "Reference code has already been used";
/// Message for a lookup that failed or timed out; the client should retry.
pub const MSG_UNAVAILABLE: &str = "Validation service temporarily unavailable. Please try again.";

/// Body of `POST /validate-reference`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateReferenceRequest {
    /// Code as typed by the registrant
    pub reference_code: String,
    /// When the client sent the request
    pub timestamp: DateTime<Utc>,
}

impl ValidateReferenceRequest {
    /// A request stamped with the current time.
    pub fn new(reference_code: impl Into<String>) -> Self {
        Self {
            reference_code: reference_code.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Body of `POST /validate-google-forms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateGoogleFormsRequest {
    /// Code as typed by the registrant
    pub reference_code: String,
    /// Details entered on the form, checked against the code
    pub user_details: Identity,
    /// When the client sent the request
    pub timestamp: DateTime<Utc>,
}

impl ValidateGoogleFormsRequest {
    /// A request stamped with the current time.
    pub fn new(reference_code: impl Into<String>, user_details: Identity) -> Self {
        Self {
            reference_code: reference_code.into(),
            user_details,
            timestamp: Utc::now(),
        }
    }
}

/// Machine-readable result of a validation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Registered and not yet used
    Validated,
    /// Unknown to the registry
    NotFound,
    /// Registered, but the submission was already processed
    AlreadyUsed,
    /// Failed local validation; never reached the registry
    Rejected,
    /// The registry could not be consulted
    Unavailable,
}

impl Outcome {
    /// HTTP status the backend answers with.
    pub fn http_status(self) -> u16 {
        match self {
            Outcome::Validated | Outcome::NotFound | Outcome::AlreadyUsed => 200,
            Outcome::Rejected => 422,
            Outcome::Unavailable => 503,
        }
    }
}

/// Response body shared by both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    /// True only for [`Outcome::Validated`]
    pub success: bool,
    /// Human-readable explanation
    pub message: String,
    /// What happened; absent from older backends, see [`ValidationResponse::outcome`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Submission details, when the registry knows the code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

/// Submission details attached to a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// Form the code was submitted through
    pub form_id: String,
    /// When the submission was recorded
    pub submission_time: DateTime<Utc>,
    /// Submission state at lookup time
    pub status: SubmissionStatus,
}

impl From<&Submission> for ResponseData {
    fn from(submission: &Submission) -> Self {
        Self {
            form_id: submission.form_id.clone(),
            submission_time: submission.submission_time,
            status: submission.status,
        }
    }
}

impl ValidationResponse {
    fn validated(submission: &Submission) -> Self {
        Self {
            success: true,
            message: MSG_VALIDATED.to_string(),
            outcome: Some(Outcome::Validated),
            data: Some(ResponseData::from(submission)),
        }
    }

    fn not_found() -> Self {
        Self::failure(Outcome::NotFound, MSG_NOT_FOUND)
    }

    fn already_used(submission: &Submission) -> Self {
        Self {
            data: Some(ResponseData {
                status: SubmissionStatus::Processed,
                ..ResponseData::from(submission)
            }),
            ..Self::failure(Outcome::AlreadyUsed, MSG_ALREADY_USED)
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self::failure(Outcome::Rejected, reason)
    }

    fn unavailable() -> Self {
        Self::failure(Outcome::Unavailable, MSG_UNAVAILABLE)
    }

    fn failure(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            outcome: Some(outcome),
            data: None,
        }
    }

    /// What happened.
    ///
    /// Uses the `outcome` field when present. Bodies without one are
    /// classified from `success`, the submission status and the canonical
    /// messages; anything else is `None` and must not be read as a
    /// definitive answer.
    pub fn outcome(&self) -> Option<Outcome> {
        if let Some(outcome) = self.outcome {
            return Some(outcome);
        }
        if self.success {
            return Some(Outcome::Validated);
        }
        if matches!(&self.data, Some(d) if d.status == SubmissionStatus::Processed) {
            return Some(Outcome::AlreadyUsed);
        }
        let message = self.message.trim();
        [
            (MSG_NOT_FOUND, Outcome::NotFound),
            (MSG_ALREADY_USED, Outcome::AlreadyUsed),
            (MSG_UNAVAILABLE, Outcome::Unavailable),
        ]
        .into_iter()
        .find(|(canonical, _)| message.eq_ignore_ascii_case(canonical))
        .map(|(_, outcome)| outcome)
    }

    /// HTTP status to answer with. Unclassifiable bodies count as 503.
    pub fn http_status(&self) -> u16 {
        self.outcome()
            .map(Outcome::http_status)
            .unwrap_or(Outcome::Unavailable.http_status())
    }
}

/// Handle `POST /validate-reference`.
pub async fn handle_validate_reference(
    verifier: &Verifier,
    request: &ValidateReferenceRequest,
) -> ValidationResponse {
    let code = match ReferenceCode::parse(request.reference_code.as_str()) {
        Ok(code) => code,
        Err(e) => return ValidationResponse::rejected(e.to_string()),
    };
    match verifier.lookup(&code, &Identity::default()).await.result {
        Ok(RegistryStatus::Available(submission)) => ValidationResponse::validated(&submission),
        Ok(RegistryStatus::NotFound) => ValidationResponse::not_found(),
        Ok(RegistryStatus::AlreadyUsed(submission)) => {
            ValidationResponse::already_used(&submission)
        }
        Err(_) => ValidationResponse::unavailable(),
    }
}

/// Handle `POST /validate-google-forms`.
pub async fn handle_validate_google_forms(
    verifier: &Verifier,
    request: &ValidateGoogleFormsRequest,
) -> ValidationResponse {
    let verification = verifier
        .verify(&request.reference_code, &request.user_details)
        .await;
    let verdict = verification.verdict;
    match (verdict.error, verification.submission) {
        (None, Some(submission)) => ValidationResponse::validated(&submission),
        (None, None) => ValidationResponse::unavailable(),
        (Some(ValidationError::NotRegistered), _) => ValidationResponse::not_found(),
        (Some(ValidationError::AlreadyUsed), Some(submission)) => {
            ValidationResponse::already_used(&submission)
        }
        (Some(ValidationError::AlreadyUsed), None) => {
            ValidationResponse::failure(Outcome::AlreadyUsed, MSG_ALREADY_USED)
        }
        (Some(ValidationError::Service(_)), _) => ValidationResponse::unavailable(),
        (Some(e), _) => ValidationResponse::rejected(e.to_string()),
    }
}
