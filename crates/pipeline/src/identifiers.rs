//! Newtype domain identifiers.
//!
//! Identifiers wrap primitives so they cannot be interchanged with ordinary
//! strings flowing through log records and step payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::content_digest;

/// Number of leading hex characters of a content digest kept as a proof token.
const PROOF_TOKEN_LEN: usize = 16;

// ---------------------------------------------------------------------------

/// Identifies a single pipeline execution run (one `run()` invocation).
///
/// Generated fresh for every run; propagated through the run's tracing span so
/// all events from one execution can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RunId`] from an existing UUID (e.g. deserialised from a report).
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Truncated content digest used as the evidence cache key.
///
/// A proof token is a deterministic fingerprint of one serialized evidence
/// record, not a cryptographic proof: it is the first sixteen hex characters
/// of the record's SHA-256 digest. No uniqueness guarantee is required beyond
/// SHA-256's own collision resistance at that prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProofToken(String);

impl ProofToken {
    /// Derives the proof token for a serialized payload.
    pub fn derive(payload: &str) -> Self {
        let mut digest = content_digest(payload);
        digest.truncate(PROOF_TOKEN_LEN);
        Self(digest)
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProofToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_token_is_sixteen_hex_chars() {
        let token = ProofToken::derive(r#"{"source":"x_post"}"#);
        assert_eq!(token.as_str().len(), 16);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn proof_token_is_deterministic() {
        assert_eq!(ProofToken::derive("abc"), ProofToken::derive("abc"));
        assert_ne!(ProofToken::derive("abc"), ProofToken::derive("abd"));
    }

    #[test]
    fn proof_token_is_a_digest_prefix() {
        let token = ProofToken::derive("abc");
        assert!(content_digest("abc").starts_with(token.as_str()));
    }
}
