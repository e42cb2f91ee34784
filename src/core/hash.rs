//! core::hash
//!
//! Hashing and checksum primitives shared by the generator and validator.
//!
//! # Primitives
//!
//! - [`user_hash`] - 4-character base-36 digest of a normalized identity
//! - [`checksum`] - 2-digit decimal sum of character codes, modulo 100
//! - [`to_base36`] / [`pad_left`] - rendering helpers
//!
//! # Invariants
//!
//! - Every function here is pure and deterministic
//! - Character codes are UTF-16 code units, so characters outside the Basic
//!   Multilingual Plane contribute two units each
//! - [`user_hash`] always returns exactly [`USER_HASH_LEN`] characters

use super::types::Identity;

/// Uppercase base-36 alphabet, indexed by digit value.
pub const BASE36_ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the full user hash.
pub const USER_HASH_LEN: usize = 4;

/// Length of the checksum segment.
pub const CHECKSUM_LEN: usize = 2;

/// `36^4`: the user hash keeps the low-order four base-36 digits.
const USER_HASH_MODULUS: u32 = 36 * 36 * 36 * 36;

/// Render a number in uppercase base 36 without padding.
///
/// # Example
///
/// ```
/// use refcode::core::hash::to_base36;
///
/// assert_eq!(to_base36(0), "0");
/// assert_eq!(to_base36(35), "Z");
/// assert_eq!(to_base36(36), "10");
/// ```
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    // Every byte comes from the ASCII alphabet above.
    digits.into_iter().map(char::from).collect()
}

/// Left-pad `value` with `fill` up to `width` characters.
///
/// Values already at least `width` characters long are returned unchanged.
pub fn pad_left(value: &str, width: usize, fill: char) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }
    let mut padded: String = std::iter::repeat(fill).take(width - len).collect();
    padded.push_str(value);
    padded
}

/// Fold text into a 32-bit signed polynomial hash (`hash * 31 + unit`).
///
/// Arithmetic wraps to the signed 32-bit range at every step.
pub fn polynomial_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i32::from(unit))
    })
}

/// Normalize an identity into the text that gets hashed.
///
/// `name` and `email` are lower-cased and trimmed, `phone` is only trimmed.
/// The fields are concatenated without a separator.
pub fn normalize_identity(identity: &Identity) -> String {
    let name = identity.name.to_lowercase();
    let email = identity.email.to_lowercase();

    let mut normalized = String::with_capacity(name.len() + email.len() + identity.phone.len());
    normalized.push_str(name.trim());
    normalized.push_str(email.trim());
    normalized.push_str(identity.phone.trim());
    normalized
}

/// Compute the 4-character user hash for an identity.
///
/// The absolute value of the polynomial hash is reduced to its low-order
/// four base-36 digits and left-padded with `'0'`.
///
/// # Example
///
/// ```
/// use refcode::core::hash::user_hash;
/// use refcode::core::types::Identity;
///
/// let id = Identity::new("Asha Patel", "asha@example.com", "9876543210");
/// assert_eq!(user_hash(&id), "K8VC");
///
/// // Empty identities still produce four characters.
/// assert_eq!(user_hash(&Identity::new("", "", "")), "0000");
/// ```
pub fn user_hash(identity: &Identity) -> String {
    let hash = polynomial_hash(&normalize_identity(identity));
    let low_digits = hash.unsigned_abs() % USER_HASH_MODULUS;
    pad_left(&to_base36(u64::from(low_digits)), USER_HASH_LEN, '0')
}

/// Compute the 2-digit checksum of `data`.
///
/// Sums the UTF-16 code units, reduces modulo 100, and zero-pads.
///
/// # Example
///
/// ```
/// use refcode::core::hash::checksum;
///
/// assert_eq!(checksum(""), "00");
/// assert_eq!(checksum("ABC"), "98");
/// ```
pub fn checksum(data: &str) -> String {
    let sum: u64 = data.encode_utf16().map(u64::from).sum();
    format!("{:02}", sum % 100)
}
