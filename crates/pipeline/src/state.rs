//! The single mutable orchestration state record.
//!
//! One instance is owned exclusively by one orchestrator and shared by
//! reference across all nine steps of every run. `logs` and `cache` grow
//! monotonically for the lifetime of the instance — nothing is reset between
//! runs. `anchors` is pure metadata and never mutated after construction;
//! `agents` is fully populated by PREP and its key set never changes
//! afterwards.
//!
//! Maps are `BTreeMap` so the serialized snapshot — the digest input — is
//! deterministic.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::graph::{install_handoffs, AgentName, DependencyGraph};
use crate::identifiers::ProofToken;

/// Fixed symbolic anchors. Metadata only; the values describe what each
/// anchor stands for and are never read by any step.
pub const ANCHORS: [(&str, &str); 3] = [
    ("ALLNIGHT", "rollback"),
    ("BEDROCK", "persistence"),
    ("RIVER", "evidence"),
];

/// Registered evidence plugins. Stand-in for a larger plugin catalogue; the
/// list participates in the AWAKEN payload and the export.
pub const PLUGIN_REGISTRY: [&str; 2] = ["pubmed_api", "x_fetch"];

// ---------------------------------------------------------------------------

/// Status of one agent role. `"ready"` is the only status the pipeline ever
/// sets; the struct shape is kept so the serialized form reads
/// `{"status": "ready"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStatus {
    /// Current status string.
    pub status: String,
}

impl AgentStatus {
    /// The ready status.
    pub fn ready() -> Self {
        Self {
            status: "ready".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------

/// The shared mutable state threaded through every step of a run.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationState {
    /// Append-only event history. Arbitrary structured records: evidence
    /// items, fetch errors, choice records.
    logs: Vec<Value>,
    /// Fixed symbolic anchors; never mutated.
    anchors: BTreeMap<String, String>,
    /// Agent status table, populated by PREP.
    agents: BTreeMap<AgentName, AgentStatus>,
    /// Evidence records keyed by the proof token derived from them.
    cache: BTreeMap<ProofToken, Value>,
    /// Declared hand-off topology. Export/bookkeeping only.
    dag: DependencyGraph,
}

impl OrchestrationState {
    /// Creates a pristine state: anchors populated, everything else empty.
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            anchors: ANCHORS
                .iter()
                .map(|&(name, meaning)| (name.to_owned(), meaning.to_owned()))
                .collect(),
            agents: BTreeMap::new(),
            cache: BTreeMap::new(),
            dag: DependencyGraph::new(),
        }
    }

    /// Creates a state with agents and topology already installed — the exact
    /// shape PREP leaves behind on a fresh instance. Used for the digest
    /// baseline.
    pub fn bootstrapped() -> Self {
        let mut state = Self::new();
        state.install_agents();
        state.install_topology();
        state
    }

    /// Sets every fixed agent role to ready. Idempotent for the key set;
    /// statuses are (re)set to `"ready"` each time.
    pub fn install_agents(&mut self) {
        for agent in AgentName::ALL {
            self.agents.insert(agent, AgentStatus::ready());
        }
    }

    /// Installs the fixed hand-off topology. Idempotent.
    pub fn install_topology(&mut self) {
        install_handoffs(&mut self.dag);
    }

    /// Appends one record to the event history.
    pub fn append_log(&mut self, record: Value) {
        self.logs.push(record);
    }

    /// The full event history, oldest first.
    pub fn logs(&self) -> &[Value] {
        &self.logs
    }

    /// The most recent log record, if any.
    pub fn last_log(&self) -> Option<&Value> {
        self.logs.last()
    }

    /// Mutable access to the most recent log record, if any.
    pub fn last_log_mut(&mut self) -> Option<&mut Value> {
        self.logs.last_mut()
    }

    /// Stores an evidence record under its proof token.
    pub fn cache_put(&mut self, token: ProofToken, record: Value) {
        self.cache.insert(token, record);
    }

    /// Looks up a cached evidence record.
    pub fn cache_get(&self, token: &ProofToken) -> Option<&Value> {
        self.cache.get(token)
    }

    /// Number of log records.
    pub fn log_len(&self) -> usize {
        self.logs.len()
    }

    /// Number of cached evidence records.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// The agent status table.
    pub fn agents(&self) -> &BTreeMap<AgentName, AgentStatus> {
        &self.agents
    }

    /// The hand-off graph.
    pub fn dag(&self) -> &DependencyGraph {
        &self.dag
    }
}

impl Default for OrchestrationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pristine_state_has_anchors_and_nothing_else() {
        let state = OrchestrationState::new();
        assert_eq!(state.log_len(), 0);
        assert_eq!(state.cache_len(), 0);
        assert!(state.agents().is_empty());
        assert_eq!(state.dag().node_count(), 0);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["anchors"]["ALLNIGHT"], "rollback");
        assert_eq!(value["anchors"]["BEDROCK"], "persistence");
        assert_eq!(value["anchors"]["RIVER"], "evidence");
    }

    #[test]
    fn bootstrap_populates_all_agents_as_ready() {
        let state = OrchestrationState::bootstrapped();
        assert_eq!(state.agents().len(), 5);
        assert!(state.agents().values().all(|a| a.status == "ready"));
        assert_eq!(state.dag().node_count(), 5);
        assert_eq!(state.dag().edge_count(), 4);
    }

    #[test]
    fn repeated_installation_leaves_the_same_value() {
        let mut state = OrchestrationState::bootstrapped();
        let snapshot = serde_json::to_string(&state).unwrap();
        state.install_agents();
        state.install_topology();
        assert_eq!(serde_json::to_string(&state).unwrap(), snapshot);
    }

    #[test]
    fn logs_and_cache_grow_monotonically() {
        let mut state = OrchestrationState::bootstrapped();
        state.append_log(json!({"choice": "default"}));
        state.append_log(json!({"source": "x_post"}));
        assert_eq!(state.log_len(), 2);

        let token = ProofToken::derive("payload");
        state.cache_put(token.clone(), json!({"entropy": 0.4}));
        assert_eq!(state.cache_len(), 1);
        assert_eq!(state.cache_get(&token), Some(&json!({"entropy": 0.4})));
    }

    #[test]
    fn snapshot_serializes_the_graph_as_node_edge_lists() {
        let state = OrchestrationState::bootstrapped();
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["dag"]["nodes"].as_array().unwrap().len(), 5);
        assert_eq!(value["dag"]["edges"].as_array().unwrap().len(), 4);
    }
}
