//! refcode - registration reference codes
//!
//! Issues short reference codes bound to a registrant's name, email, and
//! phone number, validates them, and checks them against a pluggable
//! registry of accepted submissions.
//!
//! A code looks like `NRL` + timestamp(6) + random(6) + user hash(2) +
//! checksum(2), 19 characters in all. Validation recomputes everything from
//! the code and the identity supplied at validation time; nothing is stored.
//!
//! # Architecture
//!
//! - [`core`] - Code scheme, generator, validator, configuration
//! - [`registry`] - Registry abstraction and its stores
//! - [`engine`] - Execution context and the verification pipeline
//! - [`api`] - Backend wire types and handlers
//! - [`cli`] - Command-line interface layer
//! - [`ui`] - User interaction utilities
//! - [`logging`] - Diagnostic logging setup
//!
//! # Example
//!
//! ```
//! let code = refcode::generate("Asha Patel", "asha@example.com", "9876543210");
//! assert!(refcode::is_valid_format(&code));
//!
//! let verdict = refcode::validate(&code, "Asha Patel", "asha@example.com", "9876543210");
//! assert!(verdict.valid);
//!
//! let verdict = refcode::validate(&code, "Asha Patel", "asha@example.com", "9876543211");
//! assert!(!verdict.valid);
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod engine;
pub mod logging;
pub mod registry;
pub mod ui;

use chrono::{DateTime, Utc};

use crate::core::generator::CodeGenerator;
use crate::core::types::Identity;
use crate::core::validator::{CodeValidator, ValidationVerdict};

/// Issue a reference code for the given identity.
pub fn generate(name: &str, email: &str, phone: &str) -> String {
    CodeGenerator::new()
        .generate(&Identity::new(name, email, phone))
        .into()
}

/// Validate `code` against the given identity.
pub fn validate(code: &str, name: &str, email: &str, phone: &str) -> ValidationVerdict {
    CodeValidator::new().validate(code, &Identity::new(name, email, phone))
}

/// Whether `code` has the `NRL` prefix and 19 characters.
pub fn is_valid_format(code: &str) -> bool {
    CodeValidator::new().is_valid_format(code)
}

/// Decode the issue time embedded in `code`, if any.
pub fn extract_timestamp(code: &str) -> Option<DateTime<Utc>> {
    CodeValidator::new().extract_timestamp(code)
}

/// Whether `code` was issued at least `expiry_hours` ago.
///
/// Structurally invalid codes are always expired.
pub fn is_expired(code: &str, expiry_hours: u64) -> bool {
    CodeValidator::new().is_expired(code, expiry_hours)
}
