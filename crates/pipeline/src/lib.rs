//! Core orchestration domain for Inquest.
//!
//! This crate contains every domain concept of the nine-stage evidence
//! pipeline: the step vocabulary, the shared orchestration state, the digest
//! tripwire, the agent hand-off graph, and the cross-cutting port traits.
//! Infrastructure crates implement the traits defined here; they never add
//! domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RunId`, `ProofToken`) |
//! | [`step`] | Step names, fixed execution sequence, outcome records |
//! | [`graph`] | Agent roles and the hand-off dependency graph |
//! | [`state`] | The single mutable orchestration state record |
//! | [`digest`] | Canonical payloads and the non-fatal digest verifier |
//! | [`mutate`] | Random prompt mutation |
//! | [`evidence`] | Evidence records and the low-quality refinement rule |
//! | [`ports`] | `EvidenceSource` / `ExportSink` traits and their error types |

pub mod digest;
pub mod evidence;
pub mod graph;
pub mod identifiers;
pub mod mutate;
pub mod ports;
pub mod state;
pub mod step;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use digest::{content_digest, DigestVerifier};
pub use evidence::{EvidenceItem, ENTROPY_FLOOR, SEMANTIC_CEILING};
pub use graph::{AgentName, DependencyGraph, HANDOFFS};
pub use identifiers::{ProofToken, RunId};
pub use mutate::{mutate_prompt, MUTATION_LEN};
pub use ports::{EvidenceSource, ExportError, ExportSink, FetchError};
pub use state::{AgentStatus, OrchestrationState, ANCHORS, PLUGIN_REGISTRY};
pub use step::{StepName, StepRecord, DEFAULT_CHOICE};
