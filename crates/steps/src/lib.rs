//! Inquest step pipeline engine.
//!
//! This crate provides the [`Orchestrator`] that owns the shared
//! [`pipeline::OrchestrationState`], the nine step handlers (PREP through
//! ALLNIGHT), and the run loop that drives them in fixed order, collecting
//! one [`RunResults`] map per run.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Step handlers sequence calls between the domain
//! rules in the [`pipeline`] crate and the infrastructure traits
//! ([`pipeline::EvidenceSource`], [`pipeline::ExportSink`]). They contain no
//! domain rules of their own and no transport details.

mod orchestrator;
mod results;

pub use orchestrator::{Orchestrator, DEFAULT_SOURCE_ID, DEFAULT_TIER};
pub use results::RunResults;
