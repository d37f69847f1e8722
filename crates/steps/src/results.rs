//! The ordered per-run result map.

use pipeline::{StepName, StepRecord};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Result of one pipeline run: one record per step, in execution order.
///
/// Serializes as a JSON object whose keys are the step wire names, in the
/// order the steps ran — insertion order equals execution order equals
/// [`StepName::SEQUENCE`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunResults {
    entries: Vec<(StepName, StepRecord)>,
}

impl RunResults {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, step: StepName, record: StepRecord) {
        self.entries.push((step, record));
    }

    /// The record for `step`, if the step ran.
    pub fn get(&self, step: StepName) -> Option<&StepRecord> {
        self.entries
            .iter()
            .find(|(name, _)| *name == step)
            .map(|(_, record)| record)
    }

    /// Records in execution order.
    pub fn iter(&self) -> impl Iterator<Item = (StepName, &StepRecord)> {
        self.entries.iter().map(|(name, record)| (*name, record))
    }

    /// Number of step records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no step has run.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for RunResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (step, record) in &self.entries {
            map.serialize_entry(step.as_str(), record)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_in_insertion_order() {
        let mut results = RunResults::new();
        results.push(StepName::Prep, StepRecord::completed("w", json!(1), "h"));
        results.push(StepName::Awaken, StepRecord::failed(StepName::Awaken));
        let text = serde_json::to_string(&results).unwrap();
        assert!(text.find("PREP").unwrap() < text.find("AWAKEN").unwrap());
    }

    #[test]
    fn get_finds_the_step_record() {
        let mut results = RunResults::new();
        results.push(StepName::Truth, StepRecord::failed(StepName::Truth));
        assert!(results.get(StepName::Truth).unwrap().is_failed());
        assert!(results.get(StepName::Prep).is_none());
        assert_eq!(results.len(), 1);
    }
}
