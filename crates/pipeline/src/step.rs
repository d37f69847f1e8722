//! Step vocabulary: the fixed nine-stage sequence and per-step outcome records.
//!
//! The pipeline's execution order is this explicit list — never the hand-off
//! graph in [`crate::graph`], which exists for bookkeeping and export only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Choice applied when the caller does not supply one.
pub const DEFAULT_CHOICE: &str = "default";

// ---------------------------------------------------------------------------
// Step names
// ---------------------------------------------------------------------------

/// One named stage of the nine-stage pipeline.
///
/// Serializes as the uppercase wire name (`"PREP"`, `"AWAKEN"`, …) used as the
/// key of the per-run result map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StepName {
    Prep,
    Awaken,
    Question,
    Evidence,
    Narrative,
    Choose,
    Freedom,
    Truth,
    Allnight,
}

impl StepName {
    /// The fixed execution order. Step count and order are not configurable.
    pub const SEQUENCE: [StepName; 9] = [
        StepName::Prep,
        StepName::Awaken,
        StepName::Question,
        StepName::Evidence,
        StepName::Narrative,
        StepName::Choose,
        StepName::Freedom,
        StepName::Truth,
        StepName::Allnight,
    ];

    /// Returns the uppercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            StepName::Prep => "PREP",
            StepName::Awaken => "AWAKEN",
            StepName::Question => "QUESTION",
            StepName::Evidence => "EVIDENCE",
            StepName::Narrative => "NARRATIVE",
            StepName::Choose => "CHOOSE",
            StepName::Freedom => "FREEDOM",
            StepName::Truth => "TRUTH",
            StepName::Allnight => "ALLNIGHT",
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Step outcome records
// ---------------------------------------------------------------------------

/// The structured explanation record returned by every step.
///
/// A step either completes with a `{why, what, how}` explanation or fails its
/// integrity check with an `{error}` record. Failure never aborts the outer
/// run; the record simply takes the error shape in the result map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepRecord {
    /// The step ran and its integrity check (where it gates the record) passed.
    Completed {
        /// Motive: why this stage exists.
        why: String,
        /// Payload: what the stage produced.
        what: Value,
        /// Mechanism: how the stage did it.
        how: String,
    },
    /// The step's integrity check failed; the run continues regardless.
    Failed {
        /// Always `"<STEP> failed"`.
        error: String,
    },
}

impl StepRecord {
    /// Builds a completed record.
    pub fn completed(why: impl Into<String>, what: Value, how: impl Into<String>) -> Self {
        StepRecord::Completed {
            why: why.into(),
            what,
            how: how.into(),
        }
    }

    /// Builds the failure record for `step`.
    pub fn failed(step: StepName) -> Self {
        StepRecord::Failed {
            error: format!("{step} failed"),
        }
    }

    /// Returns `true` for the failure shape.
    pub fn is_failed(&self) -> bool {
        matches!(self, StepRecord::Failed { .. })
    }

    /// Returns the payload of a completed record.
    pub fn what(&self) -> Option<&Value> {
        match self {
            StepRecord::Completed { what, .. } => Some(what),
            StepRecord::Failed { .. } => None,
        }
    }

    /// Returns the error text of a failure record.
    pub fn error(&self) -> Option<&str> {
        match self {
            StepRecord::Completed { .. } => None,
            StepRecord::Failed { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sequence_is_the_fixed_nine_stage_order() {
        let names: Vec<&str> = StepName::SEQUENCE.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            [
                "PREP",
                "AWAKEN",
                "QUESTION",
                "EVIDENCE",
                "NARRATIVE",
                "CHOOSE",
                "FREEDOM",
                "TRUTH",
                "ALLNIGHT"
            ]
        );
    }

    #[test]
    fn step_name_serializes_as_wire_name() {
        assert_eq!(
            serde_json::to_string(&StepName::Allnight).unwrap(),
            r#""ALLNIGHT""#
        );
    }

    #[test]
    fn completed_record_has_why_what_how_shape() {
        let record = StepRecord::completed("deep probe", json!({"k": 1}), "async interrogation");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["why"], "deep probe");
        assert_eq!(value["what"]["k"], 1);
        assert_eq!(value["how"], "async interrogation");
        assert!(!record.is_failed());
    }

    #[test]
    fn failed_record_names_the_step() {
        let record = StepRecord::failed(StepName::Evidence);
        assert!(record.is_failed());
        assert_eq!(record.error(), Some("EVIDENCE failed"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"error": "EVIDENCE failed"}));
    }
}
