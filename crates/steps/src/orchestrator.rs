//! The orchestrator: one owned state, nine step handlers, one run loop.
//!
//! Execution is strictly sequential: each step runs to completion and its
//! mutations are visible to the next. The only true suspension points are the
//! evidence fetch inside QUESTION and the export write inside ALLNIGHT. The
//! run loop is the explicit [`StepName::SEQUENCE`] list — the hand-off graph
//! in the state is never consulted for scheduling.
//!
//! No step handler returns a `Result`: every failure mode — tripped integrity
//! check, fetch failure, persist failure — is folded into the step's record,
//! and `run` always returns a complete nine-entry map.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn, Instrument};

use pipeline::digest::{awaken_payload, choice_payload, snapshot_payload};
use pipeline::evidence::refine_low_quality;
use pipeline::{
    mutate_prompt, DigestVerifier, EvidenceSource, ExportSink, OrchestrationState, ProofToken,
    RunId, StepName, StepRecord,
};

use crate::results::RunResults;

/// Source identifier handed to the evidence source on every QUESTION step.
pub const DEFAULT_SOURCE_ID: &str = "x_post";

/// Default orchestrator tier label.
pub const DEFAULT_TIER: &str = "JuggernautApex";

/// Owns the orchestration state and drives the nine-stage pipeline.
///
/// One instance serves any number of runs; logs and cache accumulate across
/// them. `run` takes `&mut self`, so the exclusive borrow serializes access —
/// one run at a time per instance, with no interior locking.
pub struct Orchestrator {
    tier: String,
    state: OrchestrationState,
    verifier: DigestVerifier,
    source: Arc<dyn EvidenceSource>,
    sink: Arc<dyn ExportSink>,
    source_id: String,
}

impl Orchestrator {
    /// Creates an orchestrator and runs PREP once, synchronously, so agents
    /// and topology exist before the first `run` call.
    pub fn new(source: Arc<dyn EvidenceSource>, sink: Arc<dyn ExportSink>) -> Self {
        let mut orchestrator = Self {
            tier: DEFAULT_TIER.to_owned(),
            state: OrchestrationState::new(),
            verifier: DigestVerifier::baseline(),
            source,
            sink,
            source_id: DEFAULT_SOURCE_ID.to_owned(),
        };
        let record = orchestrator.step_prep();
        debug!(?record, "construction-time PREP");
        orchestrator
    }

    /// Overrides the tier label.
    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    /// Overrides the evidence source identifier passed on QUESTION.
    pub fn with_source_id(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// The shared state, for inspection.
    pub fn state(&self) -> &OrchestrationState {
        &self.state
    }

    /// The export object ALLNIGHT persists: the full state plus the graph as
    /// a separate node/edge list.
    pub fn export_snapshot(&self) -> Value {
        json!({
            "state": &self.state,
            "dag": self.state.dag(),
        })
    }

    /// Runs all nine steps in fixed order and returns their records.
    ///
    /// Never fails: the returned map always has exactly nine entries keyed by
    /// step name in execution order, with `{error}` records standing in for
    /// steps whose integrity check tripped.
    pub async fn run(&mut self, query: &str, choice: &str) -> RunResults {
        let run_id = RunId::new_random();
        let span = tracing::info_span!("pipeline_run", %run_id, tier = %self.tier);
        async {
            let mut results = RunResults::new();
            for step in StepName::SEQUENCE {
                let record = match step {
                    StepName::Prep => self.step_prep(),
                    StepName::Awaken => self.step_awaken().await,
                    StepName::Question => self.step_question(query).await,
                    StepName::Evidence => self.step_evidence().await,
                    StepName::Narrative => self.step_narrative().await,
                    StepName::Choose => self.step_choose(choice).await,
                    StepName::Freedom => self.step_freedom().await,
                    StepName::Truth => self.step_truth().await,
                    StepName::Allnight => self.step_allnight().await,
                };
                debug!(%step, failed = record.is_failed(), "step finished");
                results.push(step, record);
            }
            results
        }
        .instrument(span)
        .await
    }

    // -----------------------------------------------------------------------
    // Step handlers
    // -----------------------------------------------------------------------

    /// PREP: install agents and topology, then verify the full snapshot.
    /// Runs at construction and again as the first step of every run;
    /// installation is idempotent, the snapshot check only passes while the
    /// instance is pristine.
    fn step_prep(&mut self) -> StepRecord {
        self.state.install_agents();
        self.state.install_topology();
        if self.verifier.verify(StepName::Prep, &snapshot_payload(&self.state)) {
            StepRecord::completed("init orchestration", json!("DAG/cache ready"), "refined async setup")
        } else {
            StepRecord::failed(StepName::Prep)
        }
    }

    /// AWAKEN: verify the agent roster merged with the plugin registry.
    async fn step_awaken(&self) -> StepRecord {
        if self.verifier.verify(StepName::Awaken, &awaken_payload(&self.state)) {
            StepRecord::completed("beast foundation", json!("JSON/agents/plugins"), "async role init")
        } else {
            StepRecord::failed(StepName::Awaken)
        }
    }

    /// QUESTION: fetch one evidence record and append it to the logs.
    ///
    /// The query is first refined into a `{why, what, how}` record; when the
    /// evidence check trips, the refined query is mutated as a best-effort
    /// remediation. The refined record is advisory — it is surfaced at debug
    /// level and not consumed downstream. A fetch failure is folded into a
    /// value-level `{"error": …}` record that takes the evidence's place.
    async fn step_question(&mut self, query: &str) -> StepRecord {
        let mut refined = refine_query(query);
        let evidence: Value = match self.source.fetch(&self.source_id).await {
            Ok(item) => item.into(),
            Err(error) => {
                warn!(%error, source = %self.source_id, "evidence fetch failed");
                json!({ "error": error.to_string() })
            }
        };
        if !self.verifier.verify(StepName::Question, &evidence.to_string()) {
            refined["query"] = Value::String(mutate_prompt(query));
            debug!(%refined, "refined query mutated after integrity mismatch");
        }
        self.state.append_log(evidence.clone());
        StepRecord::completed("deep probe", evidence, "async interrogation")
    }

    /// EVIDENCE: refine the most recent log record in place when its quality
    /// is low, derive its proof token, and cache it under that token.
    ///
    /// The in-place refinement means the log entry and the cached record are
    /// always the same value.
    async fn step_evidence(&mut self) -> StepRecord {
        let mut record = self.state.last_log().cloned().unwrap_or_else(|| json!({}));
        if refine_low_quality(&mut record) {
            if let Some(entry) = self.state.last_log_mut() {
                *entry = record.clone();
            }
        }
        let payload = record.to_string();
        let token = ProofToken::derive(&payload);
        self.state.cache_put(token.clone(), record);
        if self.verifier.verify(StepName::Evidence, &payload) {
            StepRecord::completed("verify truth", json!(format!("ZK-proof: {token}")), "genetic process")
        } else {
            StepRecord::failed(StepName::Evidence)
        }
    }

    /// NARRATIVE: weave a story string around the most recent log record.
    async fn step_narrative(&self) -> StepRecord {
        let story = match self.state.last_log() {
            Some(record) => format!("From logs: {record}"),
            None => "From logs: No data".to_owned(),
        };
        let narrative = json!({ "story": story });
        if self.verifier.verify(StepName::Narrative, &narrative.to_string()) {
            StepRecord::completed("synthesize truth", narrative, "DAG role weave")
        } else {
            StepRecord::failed(StepName::Narrative)
        }
    }

    /// CHOOSE: append the user's choice to the logs.
    async fn step_choose(&mut self, choice: &str) -> StepRecord {
        self.state.append_log(json!({ "choice": choice }));
        if self.verifier.verify(StepName::Choose, &choice_payload(choice)) {
            StepRecord::completed("empower path", json!(choice), "lightweight handoff")
        } else {
            StepRecord::failed(StepName::Choose)
        }
    }

    /// FREEDOM: mutate the literal string `"freedom"`.
    async fn step_freedom(&self) -> StepRecord {
        let evolved = mutate_prompt("freedom");
        if self.verifier.verify(StepName::Freedom, &evolved) {
            StepRecord::completed("unchain truth", json!(evolved), "genetic override")
        } else {
            StepRecord::failed(StepName::Freedom)
        }
    }

    /// TRUTH: wrap the most recent log record — which, in a full run, is the
    /// choice CHOOSE just appended — as the delivered truth.
    async fn step_truth(&self) -> StepRecord {
        let delivered = self
            .state
            .last_log()
            .cloned()
            .unwrap_or_else(|| json!("No truth"));
        let truth = json!({ "truth": delivered });
        if self.verifier.verify(StepName::Truth, &truth.to_string()) {
            StepRecord::completed("deliver insight", truth, "ZK-verified")
        } else {
            StepRecord::failed(StepName::Truth)
        }
    }

    /// ALLNIGHT: persist the export, then verify it.
    ///
    /// The export is written unconditionally — it is the run's durable
    /// artifact and must exist whether or not the tripwire fires. A persist
    /// failure downgrades to the step's failure record.
    async fn step_allnight(&self) -> StepRecord {
        let export = self.export_snapshot();
        if let Err(error) = self.sink.persist(&export).await {
            warn!(%error, "export persist failed");
            return StepRecord::failed(StepName::Allnight);
        }
        if self.verifier.verify(StepName::Allnight, &export.to_string()) {
            StepRecord::completed("eternal anchor", json!("JSON/graph export"), "persistent save")
        } else {
            StepRecord::failed(StepName::Allnight)
        }
    }
}

/// Refines a raw query into the `{why, what, how}` structure.
fn refine_query(query: &str) -> Value {
    json!({
        "why": "motives",
        "what": query,
        "how": "mechanisms",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refined_query_carries_the_raw_query_as_what() {
        let refined = refine_query("Analyze X post");
        assert_eq!(refined["why"], "motives");
        assert_eq!(refined["what"], "Analyze X post");
        assert_eq!(refined["how"], "mechanisms");
    }
}
