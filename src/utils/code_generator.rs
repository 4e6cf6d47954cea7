//! Short code generation strategies.
//!
//! Two strategies are supported and a deployment picks exactly one:
//!
//! - **Random**: uniformly drawn alphanumeric codes. Collisions are detected
//!   by the store's unique constraint and the caller retries.
//! - **Encoded**: the link's numeric identifier run through a salted
//!   bijection and written in base62. Distinct identifiers never collide, so
//!   no retries are needed, but the identifier must exist first.

use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};

/// Length of randomly generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Upper bound on code length accepted for lookups.
pub const MAX_CODE_LENGTH: usize = 32;

/// Base62 alphabet used by the encoded strategy.
const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Identifiers are mapped inside a 40-bit space.
const ID_BITS: u32 = 40;
const ID_MASK: u64 = (1_u64 << ID_BITS) - 1;

/// Odd multiplier, hence invertible modulo 2^40.
const MULTIPLIER: u64 = 0x9E37_79B9;

/// Strategy used to produce short codes for new links.
#[derive(Debug, Clone)]
pub enum CodeGenerator {
    Random { length: usize },
    Encoded(IdEncoder),
}

impl CodeGenerator {
    /// Random strategy with [`DEFAULT_CODE_LENGTH`].
    pub fn random() -> Self {
        Self::Random {
            length: DEFAULT_CODE_LENGTH,
        }
    }

    /// Encoding strategy keyed by `salt`.
    pub fn encoded(salt: &str, min_length: usize) -> Self {
        Self::Encoded(IdEncoder::new(salt, min_length))
    }

    /// Returns true when codes are derived from a pre-reserved identifier.
    pub fn needs_id(&self) -> bool {
        matches!(self, Self::Encoded(_))
    }
}

/// Draws `length` characters uniformly from `[A-Za-z0-9]`.
pub fn generate_random_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Returns true if `code` could have been produced by either strategy.
///
/// Lookups with anything else are answered with 404 without touching the store.
pub fn is_well_formed_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Reversible, salted mapping from link identifiers to codes.
#[derive(Clone)]
pub struct IdEncoder {
    mask: u64,
    inverse: u64,
    min_length: usize,
}

impl std::fmt::Debug for IdEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdEncoder")
            .field("min_length", &self.min_length)
            .finish_non_exhaustive()
    }
}

impl IdEncoder {
    pub fn new(salt: &str, min_length: usize) -> Self {
        let digest = Sha256::digest(salt.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);

        Self {
            mask: u64::from_be_bytes(seed) & ID_MASK,
            inverse: modular_inverse(MULTIPLIER) & ID_MASK,
            min_length,
        }
    }

    /// Encodes `id`, or returns `None` if it falls outside the 40-bit space.
    pub fn encode(&self, id: i64) -> Option<String> {
        let id = u64::try_from(id).ok().filter(|id| *id <= ID_MASK)?;
        let scrambled = (id.wrapping_mul(MULTIPLIER) & ID_MASK) ^ self.mask;

        let mut digits = Vec::with_capacity(self.min_length.max(7));
        let mut rest = scrambled;
        loop {
            digits.push(ALPHABET[(rest % 62) as usize]);
            rest /= 62;
            if rest == 0 {
                break;
            }
        }
        while digits.len() < self.min_length {
            digits.push(ALPHABET[0]);
        }
        digits.reverse();

        Some(digits.into_iter().map(char::from).collect())
    }

    /// Recovers the identifier a code was produced from.
    pub fn decode(&self, code: &str) -> Option<i64> {
        let mut scrambled: u64 = 0;
        for b in code.bytes() {
            let digit = ALPHABET.iter().position(|c| *c == b)? as u64;
            scrambled = scrambled.checked_mul(62)?.checked_add(digit)?;
        }
        if scrambled > ID_MASK {
            return None;
        }

        let id = ((scrambled ^ self.mask).wrapping_mul(self.inverse)) & ID_MASK;
        i64::try_from(id).ok()
    }
}

/// Inverse of an odd `a` modulo 2^64 by Newton iteration.
fn modular_inverse(a: u64) -> u64 {
    let mut inverse = a;
    for _ in 0..6 {
        inverse = inverse.wrapping_mul(2_u64.wrapping_sub(a.wrapping_mul(inverse)));
    }
    inverse
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_random_code_has_default_length() {
        let code = generate_random_code(DEFAULT_CODE_LENGTH);
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn test_random_code_is_alphanumeric() {
        for _ in 0..100 {
            let code = generate_random_code(DEFAULT_CODE_LENGTH);
            assert!(code.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_random_codes_rarely_repeat() {
        let codes: HashSet<String> = (0..1000)
            .map(|_| generate_random_code(DEFAULT_CODE_LENGTH))
            .collect();

        assert!(codes.len() > 990);
    }

    #[test]
    fn test_modular_inverse() {
        assert_eq!(MULTIPLIER.wrapping_mul(modular_inverse(MULTIPLIER)), 1);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let encoder = IdEncoder::new("pepper", 6);

        for id in [0, 1, 2, 61, 62, 1_000, 123_456_789, ID_MASK as i64] {
            let code = encoder.encode(id).unwrap();
            assert!(code.len() >= 6, "code {code} too short");
            assert_eq!(encoder.decode(&code), Some(id));
        }
    }

    #[test]
    fn test_encode_is_collision_free_for_consecutive_ids() {
        let encoder = IdEncoder::new("pepper", 6);
        let codes: HashSet<String> = (1..=10_000).map(|id| encoder.encode(id).unwrap()).collect();

        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn test_salt_changes_codes() {
        let a = IdEncoder::new("salt-a", 6);
        let b = IdEncoder::new("salt-b", 6);

        assert_ne!(a.encode(42), b.encode(42));
    }

    #[test]
    fn test_encode_rejects_out_of_range_ids() {
        let encoder = IdEncoder::new("pepper", 6);

        assert!(encoder.encode(-1).is_none());
        assert!(encoder.encode(ID_MASK as i64 + 1).is_none());
    }

    #[test]
    fn test_decode_rejects_foreign_codes() {
        let encoder = IdEncoder::new("pepper", 6);

        assert!(encoder.decode("ab-cd").is_none());
        assert!(encoder.decode("ZZZZZZZZZZZZ").is_none());
    }

    #[test]
    fn test_needs_id() {
        assert!(!CodeGenerator::random().needs_id());
        assert!(CodeGenerator::encoded("pepper", 6).needs_id());
    }

    #[test]
    fn test_is_well_formed_code() {
        assert!(is_well_formed_code("Xy19Ab"));
        assert!(!is_well_formed_code(""));
        assert!(!is_well_formed_code("has-dash"));
        assert!(!is_well_formed_code(&"a".repeat(MAX_CODE_LENGTH + 1)));
    }
}
