//! core::generator
//!
//! Issues reference codes bound to an identity.
//!
//! # Algorithm
//!
//! 1. Encode the current time as the timestamp segment
//! 2. Draw six random base-36 characters
//! 3. Compute the full 4-character user hash; embed its first two characters
//! 4. Checksum `timestamp + random + full_user_hash`
//! 5. Concatenate `"NRL" + timestamp + random + hash_prefix + checksum`
//!
//! Generation cannot fail. Two calls for the same identity produce
//! different codes because of the random segment.
//!
//! # Example
//!
//! ```
//! use refcode::core::generator::CodeGenerator;
//! use refcode::core::types::Identity;
//!
//! let generator = CodeGenerator::new();
//! let code = generator.generate(&Identity::new("Asha Patel", "asha@example.com", "9876543210"));
//! assert!(code.as_str().starts_with("NRL"));
//! assert_eq!(code.as_str().len(), 19);
//! ```

use std::sync::Arc;

use rand::Rng;

use super::clock::{self, Clock};
use super::hash::{checksum, user_hash, BASE36_ALPHABET};
use super::timestamp;
use super::types::{Identity, ReferenceCode, RANDOM_LEN, USER_HASH_PREFIX_LEN};

/// Reference code generator.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    clock: Arc<dyn Clock>,
}

impl CodeGenerator {
    /// Create a generator using the system clock.
    pub fn new() -> Self {
        Self::with_clock(clock::system())
    }

    /// Create a generator with a custom clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Issue a new reference code for `identity`.
    ///
    /// Randomness comes from the thread-local CSPRNG.
    pub fn generate(&self, identity: &Identity) -> ReferenceCode {
        self.generate_with_rng(identity, &mut rand::rng())
    }

    /// Issue a new reference code drawing randomness from `rng`.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        identity: &Identity,
        rng: &mut R,
    ) -> ReferenceCode {
        let ts = timestamp::encode(self.clock.now());
        let random = random_segment(rng);
        let full_hash = user_hash(identity);
        let sum = checksum(&format!("{}{}{}", ts, random, full_hash));

        let code =
            ReferenceCode::from_parts(&ts, &random, &full_hash[..USER_HASH_PREFIX_LEN], &sum);
        tracing::debug!(code = %code, "issued reference code");
        code
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw [`RANDOM_LEN`] characters uniformly from the base-36 alphabet.
fn random_segment<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RANDOM_LEN)
        .map(|_| char::from(BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::types::CODE_LEN;
    use chrono::{TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn asha() -> Identity {
        Identity::new("Asha Patel", "asha@example.com", "9876543210")
    }

    fn frozen() -> CodeGenerator {
        let t = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        CodeGenerator::with_clock(Arc::new(FixedClock::new(t)))
    }

    #[test]
    fn code_has_fixed_shape() {
        let code = CodeGenerator::new().generate(&asha());
        assert!(code.as_str().starts_with("NRL"));
        assert_eq!(code.as_str().chars().count(), CODE_LEN);
        assert!(ReferenceCode::has_valid_shape(code.as_str()));
    }

    #[test]
    fn segments_are_consistent() {
        let generator = frozen();
        let code = generator.generate(&asha());
        let seg = code.segments();

        let issued = Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap();
        assert_eq!(seg.timestamp, timestamp::encode(issued));
        assert_eq!(seg.user_hash_prefix, "K8");
        let expected = checksum(&format!("{}{}K8VC", seg.timestamp, seg.random));
        assert_eq!(seg.checksum, expected);
    }

    #[test]
    fn random_segment_is_base36_uppercase() {
        let code = CodeGenerator::new().generate(&asha());
        assert!(code
            .segments()
            .random
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()));
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let generator = frozen();
        let a = generator.generate_with_rng(&asha(), &mut StdRng::seed_from_u64(7));
        let b = generator.generate_with_rng(&asha(), &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn regeneration_differs() {
        let generator = frozen();
        let codes: std::collections::HashSet<_> =
            (0..50).map(|_| generator.generate(&asha())).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn empty_identity_still_generates() {
        let code = frozen().generate(&Identity::default());
        assert_eq!(code.as_str().chars().count(), CODE_LEN);
        assert_eq!(code.segments().user_hash_prefix, "00");
    }
}
