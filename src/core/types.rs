//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Identity`] - The (name, email, phone) triple supplied by a registrant
//! - [`ReferenceCode`] - Structurally valid 19-character reference code
//! - [`CodeSegments`] - Fixed-width fields of a reference code
//!
//! # Validation
//!
//! [`ReferenceCode`] enforces only the structural rule (prefix and length)
//! at construction time. Semantic checks (timestamp window, identity
//! binding) belong to [`crate::core::validator`].
//!
//! # Examples
//!
//! ```
//! use refcode::core::types::ReferenceCode;
//!
//! let code = ReferenceCode::parse("NRL0ABCDE7F3K9QK841").unwrap();
//! assert_eq!(code.segments().timestamp, "0ABCDE");
//! assert!(ReferenceCode::parse("XYZ1234567890123456").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validator::ValidationError;

/// Literal prefix of every reference code.
pub const CODE_PREFIX: &str = "NRL";

/// Total length of a reference code, in characters.
pub const CODE_LEN: usize = 19;

/// Length of the timestamp segment.
pub const TIMESTAMP_LEN: usize = 6;

/// Length of the random segment.
pub const RANDOM_LEN: usize = 6;

/// Length of the user hash prefix embedded in the code.
pub const USER_HASH_PREFIX_LEN: usize = 2;

/// The identity triple a reference code is bound to.
///
/// Fields are raw user input. Normalization happens only inside
/// [`crate::core::hash::user_hash`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Registrant name
    pub name: String,
    /// Registrant email
    pub email: String,
    /// Registrant phone number
    pub phone: String,
}

impl Identity {
    /// Create an identity from its three fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// A structurally valid reference code.
///
/// Layout: `"NRL" + timestamp(6) + random(6) + user_hash_prefix(2) + checksum(2)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceCode(String);

impl ReferenceCode {
    /// Parse a code, applying the structural check only.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Format`] if the code does not start with
    /// [`CODE_PREFIX`] or is not exactly [`CODE_LEN`] characters long.
    pub fn parse(code: impl Into<String>) -> Result<Self, ValidationError> {
        let code = code.into();
        if Self::has_valid_shape(&code) {
            Ok(Self(code))
        } else {
            Err(ValidationError::Format)
        }
    }

    /// Build a code from segments that are known to have the right widths.
    pub(crate) fn from_parts(
        timestamp: &str,
        random: &str,
        hash_prefix: &str,
        checksum: &str,
    ) -> Self {
        let mut code = String::with_capacity(CODE_LEN);
        code.push_str(CODE_PREFIX);
        code.push_str(timestamp);
        code.push_str(random);
        code.push_str(hash_prefix);
        code.push_str(checksum);
        debug_assert!(Self::has_valid_shape(&code));
        Self(code)
    }

    /// Structural rule: literal prefix and exact character count.
    pub fn has_valid_shape(code: &str) -> bool {
        code.starts_with(CODE_PREFIX) && code.chars().count() == CODE_LEN
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the code into its fixed-width segments.
    ///
    /// Positions are counted in characters: `[3, 9)` timestamp, `[9, 15)`
    /// random, `[15, 17)` user hash prefix, `[17, 19)` checksum.
    pub fn segments(&self) -> CodeSegments<'_> {
        let offsets: Vec<usize> = self
            .0
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(self.0.len()))
            .collect();

        let ts_start = CODE_PREFIX.len();
        let random_start = ts_start + TIMESTAMP_LEN;
        let hash_start = random_start + RANDOM_LEN;
        let checksum_start = hash_start + USER_HASH_PREFIX_LEN;

        let slice = |from: usize, to: usize| &self.0[offsets[from]..offsets[to]];

        CodeSegments {
            timestamp: slice(ts_start, random_start),
            random: slice(random_start, hash_start),
            user_hash_prefix: slice(hash_start, checksum_start),
            checksum: slice(checksum_start, CODE_LEN),
        }
    }
}

impl fmt::Display for ReferenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReferenceCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ReferenceCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ReferenceCode> for String {
    fn from(code: ReferenceCode) -> Self {
        code.0
    }
}

/// Borrowed view of the fixed-width fields of a [`ReferenceCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSegments<'a> {
    /// Encoded issue time
    pub timestamp: &'a str,
    /// Random characters
    pub random: &'a str,
    /// First two characters of the user hash
    pub user_hash_prefix: &'a str,
    /// Two-digit checksum
    pub checksum: &'a str,
}
