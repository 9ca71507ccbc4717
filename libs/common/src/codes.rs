//! Generation of short unique reference codes
//!
//! Orders carry a 12-character transaction reference drawn from an
//! alphabet without the ambiguous `0` and `O`. Callers pair [`generate_code`]
//! with a store-side existence check and retry a bounded number of times
//! on collision.

use rand::Rng;

/// Characters permitted in generated codes. `0` and `O` are excluded so
/// codes stay unambiguous when read aloud or typed back.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ123456789";

/// Length of every generated code.
pub const CODE_LEN: usize = 12;

/// Maximum number of collision retries before giving up.
pub const MAX_CODE_ATTEMPTS: u32 = 10;

/// Produce one candidate code.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn code_has_expected_length() {
        assert_eq!(generate_code().len(), CODE_LEN);
    }

    #[test]
    fn code_only_uses_allowed_characters() {
        for _ in 0..100 {
            let code = generate_code();
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)), "{code}");
        }
    }

    #[test]
    fn alphabet_excludes_ambiguous_characters() {
        assert!(!CODE_ALPHABET.contains(&b'0'));
        assert!(!CODE_ALPHABET.contains(&b'O'));
        assert_eq!(CODE_ALPHABET.len(), 35);
    }

    #[test]
    fn codes_are_distinct_in_practice() {
        let codes: HashSet<String> = (0..1000).map(|_| generate_code()).collect();
        assert_eq!(codes.len(), 1000);
    }
}
