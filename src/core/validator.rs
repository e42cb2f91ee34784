//! core::validator
//!
//! Validates reference codes against an identity.
//!
//! # Steps
//!
//! 1. Structural check: `"NRL"` prefix and exactly 19 characters
//! 2. Split the code into fixed-width segments
//! 3. Timestamp plausibility: not in the future, not older than 365 days
//! 4. Recompute the user hash and checksum from the supplied identity
//! 5. Valid iff the embedded checksum and hash prefix both match
//!
//! Nothing is stored between calls. Every verdict is recomputed from the
//! code and the identity, so validating twice with a frozen clock gives
//! identical results.
//!
//! # Error kinds
//!
//! Format, timestamp and mismatch failures are local and deterministic.
//! Registry answers (not registered, already used) are definitive. Service
//! failures are transient and the only retryable kind.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;

use super::clock::{self, Clock};
use super::hash::{checksum, user_hash};
use super::timestamp;
use super::types::{Identity, ReferenceCode, USER_HASH_PREFIX_LEN};

/// How far back a code's timestamp may lie and still be plausible.
pub const MAX_CODE_AGE_DAYS: i64 = 365;

/// Default expiry window for [`CodeValidator::is_expired`], in hours.
pub const DEFAULT_EXPIRY_HOURS: u64 = 24;

/// Reasons a reference code fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Wrong prefix or wrong length.
    #[error("invalid reference code format")]
    Format,

    /// Timestamp undecodable, in the future, or older than a year.
    #[error("reference code timestamp is invalid")]
    Timestamp,

    /// Recomputed hash or checksum disagrees with the code.
    #[error("reference code does not match your registration details")]
    Mismatch,

    /// The registry has no record of the code.
    #[error("reference code not found in registration system")]
    NotRegistered,

    /// The registry reports the code as already consumed.
    #[error("reference code has already been used")]
    AlreadyUsed,

    /// The registry could not be reached or failed.
    #[error("validation service temporarily unavailable, please try again ({0})")]
    Service(String),
}

/// Coarse classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Structural failure
    Format,
    /// Timestamp outside the plausibility window
    Timestamp,
    /// Identity binding failed
    Mismatch,
    /// Definitive registry answer
    Registry,
    /// Transient registry failure
    Service,
}

impl ValidationError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::Format => ErrorKind::Format,
            ValidationError::Timestamp => ErrorKind::Timestamp,
            ValidationError::Mismatch => ErrorKind::Mismatch,
            ValidationError::NotRegistered | ValidationError::AlreadyUsed => ErrorKind::Registry,
            ValidationError::Service(_) => ErrorKind::Service,
        }
    }

    /// Whether retrying could change the outcome.
    ///
    /// Only service failures are retryable.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Service
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Format => write!(f, "format"),
            ErrorKind::Timestamp => write!(f, "timestamp"),
            ErrorKind::Mismatch => write!(f, "mismatch"),
            ErrorKind::Registry => write!(f, "registry"),
            ErrorKind::Service => write!(f, "service"),
        }
    }
}

/// Values recomputed during validation, for diagnostic display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictDetails {
    /// Decoded issue time of the code
    pub timestamp: DateTime<Utc>,
    /// Full user hash recomputed from the supplied identity
    pub user_hash: String,
    /// Checksum recomputed from the code and the supplied identity
    pub checksum: String,
}

/// Outcome of validating a reference code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationVerdict {
    /// Whether the code is valid
    pub valid: bool,
    /// Why the code is invalid
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<ValidationError>,
    /// Recomputed values, present once the timestamp check has passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<VerdictDetails>,
}

impl ValidationVerdict {
    /// A passing verdict.
    pub fn valid(details: VerdictDetails) -> Self {
        Self {
            valid: true,
            error: None,
            details: Some(details),
        }
    }

    /// A failing verdict with no details.
    pub fn invalid(error: ValidationError) -> Self {
        Self {
            valid: false,
            error: Some(error),
            details: None,
        }
    }

    /// Human-readable reason, if invalid.
    pub fn reason(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Kind of failure, if invalid.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ValidationError::kind)
    }
}

fn serialize_error<S: Serializer>(
    error: &Option<ValidationError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Reference code validator.
#[derive(Debug, Clone)]
pub struct CodeValidator {
    clock: Arc<dyn Clock>,
}

impl CodeValidator {
    /// Create a validator using the system clock.
    pub fn new() -> Self {
        Self::with_clock(clock::system())
    }

    /// Create a validator with a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Validate `code` against `identity`.
    ///
    /// Never panics; every failure is reported in the verdict.
    pub fn validate(&self, code: &str, identity: &Identity) -> ValidationVerdict {
        let code = match ReferenceCode::parse(code) {
            Ok(code) => code,
            Err(e) => {
                tracing::debug!("rejected reference code with invalid format");
                return ValidationVerdict::invalid(e);
            }
        };
        let verdict = self.validate_code(&code, identity);
        tracing::debug!(
            code = %code,
            valid = verdict.valid,
            kind = ?verdict.error_kind(),
            "validated reference code"
        );
        verdict
    }

    /// Validate an already-parsed code against `identity`.
    pub fn validate_code(&self, code: &ReferenceCode, identity: &Identity) -> ValidationVerdict {
        let seg = code.segments();

        let issued = match timestamp::decode(seg.timestamp) {
            Some(t) if self.is_plausible(t) => t,
            _ => return ValidationVerdict::invalid(ValidationError::Timestamp),
        };

        let expected_hash = user_hash(identity);
        let expected_checksum =
            checksum(&format!("{}{}{}", seg.timestamp, seg.random, expected_hash));

        let matches = seg.checksum == expected_checksum
            && seg.user_hash_prefix == &expected_hash[..USER_HASH_PREFIX_LEN];

        let details = VerdictDetails {
            timestamp: issued,
            user_hash: expected_hash,
            checksum: expected_checksum,
        };

        if matches {
            ValidationVerdict::valid(details)
        } else {
            ValidationVerdict {
                valid: false,
                error: Some(ValidationError::Mismatch),
                details: Some(details),
            }
        }
    }

    /// Cheap structural pre-check (prefix and length only).
    pub fn is_valid_format(&self, code: &str) -> bool {
        ReferenceCode::has_valid_shape(code)
    }

    /// Decode the issue time embedded in `code`.
    ///
    /// Returns `None` for structurally invalid codes or undecodable segments.
    pub fn extract_timestamp(&self, code: &str) -> Option<DateTime<Utc>> {
        let code = ReferenceCode::parse(code).ok()?;
        timestamp::decode(code.segments().timestamp)
    }

    /// Whether `code` is older than `expiry_hours`.
    ///
    /// Structurally invalid codes count as expired. A code is expired once
    /// the current time reaches `issued + expiry_hours`, so a zero-hour
    /// window expires immediately.
    pub fn is_expired(&self, code: &str, expiry_hours: u64) -> bool {
        let Some(issued) = self.extract_timestamp(code) else {
            return true;
        };
        let window = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|window| issued.checked_add_signed(window));
        match window {
            Some(expires_at) => self.clock.now() >= expires_at,
            // Windows beyond chrono's range never end.
            None => false,
        }
    }

    fn is_plausible(&self, issued: DateTime<Utc>) -> bool {
        let now = self.clock.now();
        let oldest = now - Duration::days(MAX_CODE_AGE_DAYS);
        issued >= oldest && issued <= now
    }
}

impl Default for CodeValidator {
    fn default() -> Self {
        Self::new()
    }
}
