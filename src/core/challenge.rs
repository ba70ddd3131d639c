//! Challenge Tokens
//!
//! Opaque random tokens that correlate a connect request with its response.
//! Drawn from the OS entropy source so a remote peer cannot predict the
//! token or replay an answer from an earlier attempt.

use rand::rngs::OsRng;
use rand::RngCore;

/// Challenge length in bytes.
pub const CHALLENGE_LEN: usize = 32;

/// An opaque random token issued once per connection attempt.
///
/// The responder must echo the token byte-for-byte; the verifier compares
/// the echo against the pending attempt before trusting any session
/// metadata in the response.
#[derive(Clone, PartialEq, Eq)]
pub struct Challenge([u8; CHALLENGE_LEN]);

impl Challenge {
    /// Generate a fresh token from OS entropy.
    ///
    /// An entropy-source failure aborts the process; there is no recovery
    /// path a caller could take.
    pub fn generate() -> Self {
        let mut bytes = [0u8; CHALLENGE_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Raw token bytes as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte-exact comparison against an echoed wire value.
    pub fn matches(&self, echoed: &[u8]) -> bool {
        self.0[..] == *echoed
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Challenge({}..)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short prefix only; full tokens never belong in log lines.
        write!(f, "{}..", hex::encode(&self.0[..4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_challenge_has_fixed_length() {
        let challenge = Challenge::generate();
        assert_eq!(challenge.as_bytes().len(), CHALLENGE_LEN);
    }

    #[test]
    fn test_no_collision_in_many_draws() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(Challenge::generate().0));
        }
    }

    #[test]
    fn test_matches_is_byte_exact() {
        let challenge = Challenge::generate();
        let mut echoed = challenge.as_bytes().to_vec();
        assert!(challenge.matches(&echoed));

        echoed[0] ^= 0x01;
        assert!(!challenge.matches(&echoed));

        // A truncated echo never matches.
        assert!(!challenge.matches(&challenge.as_bytes()[..CHALLENGE_LEN - 1]));
    }

    #[test]
    fn test_debug_does_not_leak_full_token() {
        let challenge = Challenge::generate();
        let rendered = format!("{:?}", challenge);
        assert!(rendered.len() < CHALLENGE_LEN * 2);
    }
}
