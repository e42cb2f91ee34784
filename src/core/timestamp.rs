//! core::timestamp
//!
//! Encoding of the issue time carried in a reference code.
//!
//! # Format
//!
//! Whole seconds since [`CODE_EPOCH_SECS`] (2024-01-01T00:00:00Z), rendered
//! in uppercase base 36 and left-padded with `'0'` to six characters. Six
//! digits cover `36^6 - 1` seconds, roughly 69 years.
//!
//! Generation and validation both go through this module, so the encoding
//! is the same end to end. Decoding is case-insensitive.

use chrono::{DateTime, Utc};

use super::hash::{pad_left, to_base36};
use super::types::TIMESTAMP_LEN;

/// Unix time of the code epoch, 2024-01-01T00:00:00Z.
pub const CODE_EPOCH_SECS: i64 = 1_704_067_200;

/// Largest offset representable in the timestamp segment (`ZZZZZZ`).
pub const MAX_OFFSET_SECS: u64 = 36u64.pow(TIMESTAMP_LEN as u32) - 1;

/// Encode an instant as a six-character timestamp segment.
///
/// Instants before the epoch clamp to `000000`, instants past the range
/// clamp to `ZZZZZZ`. Sub-second precision is dropped.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use refcode::core::timestamp::encode;
///
/// let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 36).unwrap();
/// assert_eq!(encode(t), "000010");
/// ```
pub fn encode(instant: DateTime<Utc>) -> String {
    let offset = instant.timestamp() - CODE_EPOCH_SECS;
    let offset = u64::try_from(offset).unwrap_or(0).min(MAX_OFFSET_SECS);
    pad_left(&to_base36(offset), TIMESTAMP_LEN, '0')
}

/// Decode a timestamp segment back into an instant.
///
/// Returns `None` unless the segment is exactly six ASCII base-36 digits.
pub fn decode(segment: &str) -> Option<DateTime<Utc>> {
    if segment.len() != TIMESTAMP_LEN || !segment.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    let offset = u64::from_str_radix(segment, 36).ok()?;
    let secs = CODE_EPOCH_SECS.checked_add(i64::try_from(offset).ok()?)?;
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn epoch_constant_matches_date() {
        assert_eq!(epoch().timestamp(), CODE_EPOCH_SECS);
    }

    #[test]
    fn encode_epoch_is_zero() {
        assert_eq!(encode(epoch()), "000000");
    }

    #[test]
    fn encode_drops_subsecond_precision() {
        let t = epoch() + Duration::milliseconds(1_999);
        assert_eq!(encode(t), "000001");
    }

    #[test]
    fn encode_clamps_before_epoch() {
        assert_eq!(encode(epoch() - Duration::days(10)), "000000");
    }

    #[test]
    fn encode_clamps_past_range() {
        assert_eq!(encode(epoch() + Duration::days(365 * 100)), "ZZZZZZ");
    }

    #[test]
    fn decode_inverts_encode() {
        let t = Utc.with_ymd_and_hms(2026, 10, 17, 12, 34, 56).unwrap();
        assert_eq!(decode(&encode(t)), Some(t));
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(decode("00000a"), decode("00000A"));
        assert_eq!(decode("00000A"), Some(epoch() + Duration::seconds(10)));
    }

    #[test]
    fn decode_rejects_non_digits() {
        assert_eq!(decode("+00001"), None);
        assert_eq!(decode("00-001"), None);
        assert_eq!(decode("é0000"), None);
        assert_eq!(decode("00001"), None);
        assert_eq!(decode("0000001"), None);
    }
}
