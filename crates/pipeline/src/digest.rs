//! Canonical payloads and the non-fatal digest tripwire.
//!
//! Every step serializes its output and compares the SHA-256 digest against a
//! fixed per-step expected value. The comparison is a *diagnostic tripwire*,
//! not an authorization gate: a mismatch emits a warning naming the step and
//! its reroute key, and the pipeline always continues. Callers decide what to
//! do with the boolean — ignore it, attempt a prompt mutation, or substitute
//! an error record for the step's result.
//!
//! The expected table is built once per verifier. Steps whose canonical
//! payloads are deterministic on an untampered default first run (PREP,
//! AWAKEN, CHOOSE, TRUTH) get digests computed from those payloads, so a
//! clean run passes their checks. Entropy-dependent steps keep fixed sentinel
//! values that are shorter than any SHA-256 digest and therefore can never
//! match — for those, a mismatch is the normal texture of a run.
//!
//! The payload helpers here are shared between the baseline computation and
//! the step handlers so the two can never disagree on byte content.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::state::{OrchestrationState, PLUGIN_REGISTRY};
use crate::step::{StepName, DEFAULT_CHOICE};

/// Lowercase hex SHA-256 digest of a serialized payload.
pub fn content_digest(payload: &str) -> String {
    hex::encode(Sha256::digest(payload.as_bytes()))
}

// ---------------------------------------------------------------------------
// Canonical payloads
// ---------------------------------------------------------------------------

/// Serialized form of the full orchestration state, as verified by PREP.
pub fn snapshot_payload(state: &OrchestrationState) -> String {
    // The state contains only string-keyed maps and plain values, so
    // serialization cannot fail.
    serde_json::to_string(state).unwrap_or_default()
}

/// Serialized agent-status table merged with the plugin registry, as verified
/// by AWAKEN.
pub fn awaken_payload(state: &OrchestrationState) -> String {
    let mut merged = serde_json::Map::new();
    for (agent, status) in state.agents() {
        merged.insert(
            agent.as_str().to_owned(),
            json!({"status": status.status.clone()}),
        );
    }
    merged.insert("plugins".to_owned(), json!(PLUGIN_REGISTRY));
    Value::Object(merged).to_string()
}

/// Serialized choice record, as verified by CHOOSE.
pub fn choice_payload(choice: &str) -> String {
    json!({ "choice": choice }).to_string()
}

// ---------------------------------------------------------------------------
// Verifier
// ---------------------------------------------------------------------------

/// Sentinel expected values for the entropy-dependent steps. 32 hex chars —
/// shorter than any SHA-256 digest, so the comparison always fails and the
/// tripwire fires on every run.
const QUESTION_SENTINEL: &str = "8f14e45fceea167a5a36dedd4bea2543";
const EVIDENCE_SENTINEL: &str = "c9f0f895fb98ab9159f51fd0297e236d";
const NARRATIVE_SENTINEL: &str = "a5d5c6e8d2f0a7b3c1e9d4f8e2a0b7c3";
const FREEDOM_SENTINEL: &str = "d3d9446802a44259755d38e6d163e820";
const ALLNIGHT_SENTINEL: &str = "9f86d081884c7d659a2feaa0c55ad015";

/// Static per-step reroute keys. Purely informational: a mismatch warning
/// names the key, nothing ever reroutes through it.
const REROUTE_KEYS: [(StepName, &str); 9] = [
    (StepName::Prep, "aBcDeFgHiJkLmNoPqRsT"),
    (StepName::Awaken, "fEqNCco3Yq9h5ZUglD3CZJT4YYv3"),
    (StepName::Question, "jxT0X87p2meqY2W9K0T6PQ=="),
    (StepName::Evidence, "yfD4lVuYq5FZX1HQKX4jbQ=="),
    (StepName::Narrative, "pdXG6NLwp7PB6dT44qC3ww=="),
    (StepName::Choose, "RcSMzi4tf73qGvxRx8atJg=="),
    (StepName::Freedom, "09lEaAKkQll5XTho0WPgIA=="),
    (StepName::Truth, "uOL0oMbp17Kh+MTh2bCnwA=="),
    (StepName::Allnight, "n4bQgYhI3HZZ6iL8xVWoBQ=="),
];

/// Compares step outputs against a fixed expected-digest table.
///
/// `verify` is a pure function of the step name and the payload bytes: the
/// same inputs produce the same boolean regardless of call count or ordering.
#[derive(Debug, Clone)]
pub struct DigestVerifier {
    expected: BTreeMap<StepName, String>,
    reroute: BTreeMap<StepName, &'static str>,
}

impl DigestVerifier {
    /// Builds the expected table for an untampered default run.
    pub fn baseline() -> Self {
        let pristine = OrchestrationState::bootstrapped();
        let expected = BTreeMap::from([
            (
                StepName::Prep,
                content_digest(&snapshot_payload(&pristine)),
            ),
            (
                StepName::Awaken,
                content_digest(&awaken_payload(&pristine)),
            ),
            (StepName::Question, QUESTION_SENTINEL.to_owned()),
            (StepName::Evidence, EVIDENCE_SENTINEL.to_owned()),
            (StepName::Narrative, NARRATIVE_SENTINEL.to_owned()),
            (
                StepName::Choose,
                content_digest(&choice_payload(DEFAULT_CHOICE)),
            ),
            (StepName::Freedom, FREEDOM_SENTINEL.to_owned()),
            (
                StepName::Truth,
                content_digest(&json!({"truth": {"choice": DEFAULT_CHOICE}}).to_string()),
            ),
            (StepName::Allnight, ALLNIGHT_SENTINEL.to_owned()),
        ]);
        Self {
            expected,
            reroute: REROUTE_KEYS.into_iter().collect(),
        }
    }

    /// Compares the payload's digest against the step's expected value.
    ///
    /// On mismatch this warns — naming the step and its reroute key — and
    /// returns `false`. It never panics and never halts anything; the caller
    /// alone decides whether the mismatch matters.
    pub fn verify(&self, step: StepName, payload: &str) -> bool {
        let computed = content_digest(payload);
        let expected = self.expected.get(&step).map(String::as_str).unwrap_or("");
        if computed == expected {
            return true;
        }
        warn!(
            step = %step,
            reroute_key = self.reroute.get(&step).copied().unwrap_or("unknown"),
            "integrity mismatch detected"
        );
        false
    }
}

impl Default for DigestVerifier {
    fn default() -> Self {
        Self::baseline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_is_a_pure_function_of_its_inputs() {
        let verifier = DigestVerifier::baseline();
        let payload = choice_payload(DEFAULT_CHOICE);
        let first = verifier.verify(StepName::Choose, &payload);
        for _ in 0..3 {
            assert_eq!(verifier.verify(StepName::Choose, &payload), first);
        }
    }

    #[test]
    fn pristine_snapshot_passes_the_prep_check() {
        let verifier = DigestVerifier::baseline();
        let pristine = OrchestrationState::bootstrapped();
        assert!(verifier.verify(StepName::Prep, &snapshot_payload(&pristine)));
    }

    #[test]
    fn awaken_payload_passes_for_bootstrapped_agents() {
        let verifier = DigestVerifier::baseline();
        let pristine = OrchestrationState::bootstrapped();
        assert!(verifier.verify(StepName::Awaken, &awaken_payload(&pristine)));
    }

    #[test]
    fn default_choice_passes_and_other_choices_fail() {
        let verifier = DigestVerifier::baseline();
        assert!(verifier.verify(StepName::Choose, &choice_payload("default")));
        assert!(!verifier.verify(StepName::Choose, &choice_payload("explore")));
    }

    #[test]
    fn tampered_snapshot_trips_the_wire_without_panicking() {
        let verifier = DigestVerifier::baseline();
        let mut state = OrchestrationState::bootstrapped();
        state.append_log(serde_json::json!({"tampered": true}));
        assert!(!verifier.verify(StepName::Prep, &snapshot_payload(&state)));
    }

    #[test]
    fn sentinel_steps_can_never_match() {
        let verifier = DigestVerifier::baseline();
        // Whatever the payload, a 32-char sentinel never equals a 64-char digest.
        for payload in ["", "freedom", r#"{"entropy":0.42}"#] {
            assert!(!verifier.verify(StepName::Freedom, payload));
            assert!(!verifier.verify(StepName::Allnight, payload));
        }
    }

    #[test]
    fn content_digest_is_lowercase_hex_sha256() {
        let digest = content_digest("abc");
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
