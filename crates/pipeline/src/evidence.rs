//! Evidence records and the low-quality refinement rule.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mutate::mutate_prompt;

/// Entropy below this marks a record as low quality.
pub const ENTROPY_FLOOR: f64 = 0.5;

/// Semantic score at or above this exempts a record from refinement.
pub const SEMANTIC_CEILING: f64 = 0.95;

/// Default entropy assumed when a record carries none.
const ENTROPY_DEFAULT: f64 = 1.0;

/// Default semantic score assumed when a record carries none.
const SEMANTIC_DEFAULT: f64 = 0.0;

// ---------------------------------------------------------------------------

/// One piece of fetched evidence.
///
/// This is the wire contract of an [`crate::ports::EvidenceSource`]: `source`,
/// `data`, and an entropy estimate in `[0, 1]`. `semantic_score` and `query`
/// only appear once downstream processing has attached them, so both are
/// omitted from the serialized form while absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Identifier of the feed the record came from.
    pub source: String,
    /// Raw fetched content.
    pub data: String,
    /// Quality estimate in `[0, 1]`; higher is better.
    #[serde(default = "default_entropy")]
    pub entropy: f64,
    /// Optional semantic relevance score in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    /// The query this evidence answers, once attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

fn default_entropy() -> f64 {
    ENTROPY_DEFAULT
}

impl From<EvidenceItem> for Value {
    fn from(item: EvidenceItem) -> Value {
        let mut record = Map::new();
        record.insert("source".to_owned(), Value::String(item.source));
        record.insert("data".to_owned(), Value::String(item.data));
        record.insert("entropy".to_owned(), Value::from(item.entropy));
        if let Some(score) = item.semantic_score {
            record.insert("semantic_score".to_owned(), Value::from(score));
        }
        if let Some(query) = item.query {
            record.insert("query".to_owned(), Value::String(query));
        }
        Value::Object(record)
    }
}

// ---------------------------------------------------------------------------

/// Mutates the `query` field of a low-quality record in place.
///
/// A record qualifies when `entropy < 0.5` **and** `semantic_score < 0.95`,
/// reading `entropy` as 1.0 and `semantic_score` as 0.0 when absent. The dual
/// threshold is deliberate: with the 0.0 default, an absent semantic score
/// never suppresses the mutation, so in practice only entropy gates. Returns
/// `true` when the record was mutated.
///
/// Works on arbitrary log records; non-object records are left untouched.
pub fn refine_low_quality(record: &mut Value) -> bool {
    let entropy = record
        .get("entropy")
        .and_then(Value::as_f64)
        .unwrap_or(ENTROPY_DEFAULT);
    let semantic_score = record
        .get("semantic_score")
        .and_then(Value::as_f64)
        .unwrap_or(SEMANTIC_DEFAULT);
    if entropy >= ENTROPY_FLOOR || semantic_score >= SEMANTIC_CEILING {
        return false;
    }

    let query = record
        .get("query")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();
    match record.as_object_mut() {
        Some(fields) => {
            fields.insert("query".to_owned(), Value::String(mutate_prompt(&query)));
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutate::MUTATION_LEN;
    use serde_json::json;

    #[test]
    fn low_entropy_record_gets_a_mutated_query() {
        let mut record = json!({"source": "x_post", "entropy": 0.2, "query": "probe"});
        assert!(refine_low_quality(&mut record));
        let query = record["query"].as_str().unwrap();
        assert_ne!(query, "probe");
        assert!(query.starts_with("probe"));
        assert_eq!(query.chars().count(), "probe".chars().count() + MUTATION_LEN);
    }

    #[test]
    fn missing_query_mutates_from_empty() {
        let mut record = json!({"entropy": 0.2});
        assert!(refine_low_quality(&mut record));
        assert_eq!(record["query"].as_str().unwrap().chars().count(), MUTATION_LEN);
    }

    #[test]
    fn high_entropy_record_is_left_alone() {
        let mut record = json!({"entropy": 0.7, "query": "probe"});
        assert!(!refine_low_quality(&mut record));
        assert_eq!(record["query"], "probe");
    }

    #[test]
    fn missing_entropy_defaults_high_and_blocks_mutation() {
        let mut record = json!({"choice": "default"});
        assert!(!refine_low_quality(&mut record));
        assert_eq!(record, json!({"choice": "default"}));
    }

    #[test]
    fn high_semantic_score_exempts_even_low_entropy() {
        let mut record = json!({"entropy": 0.1, "semantic_score": 0.99, "query": "probe"});
        assert!(!refine_low_quality(&mut record));
        assert_eq!(record["query"], "probe");
    }

    #[test]
    fn absent_semantic_score_never_suppresses_mutation() {
        // The 0.0 default always sits below the ceiling, so entropy alone gates.
        let mut record = json!({"entropy": 0.49});
        assert!(refine_low_quality(&mut record));
    }

    #[test]
    fn evidence_item_round_trips_optional_fields() {
        let bare = EvidenceItem {
            source: "x_post".into(),
            data: "Mock data from x_post".into(),
            entropy: 0.4,
            semantic_score: None,
            query: None,
        };
        let value = Value::from(bare.clone());
        assert!(value.get("semantic_score").is_none());
        assert!(value.get("query").is_none());
        let parsed: EvidenceItem = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, bare);
    }
}
