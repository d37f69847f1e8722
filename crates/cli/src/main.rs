//! Inquest CLI entry point.
//!
//! This binary is the composition root for the system:
//!
//! 1. **Parse arguments** — query, choice, export path, optional HTTP feed.
//! 2. **Wire observability** — `tracing-subscriber` with an `EnvFilter`; all
//!    spans and events from every crate in the workspace flow through it.
//! 3. **Construct infrastructure** — pick the evidence source (mock by
//!    default, HTTP when `--source-url` is given) and the file export sink,
//!    and inject them into the orchestrator.
//! 4. **Run once and print** — the nine-entry result map as pretty JSON.
//!
//! Step failures live inside the printed map as `{error}` entries; only
//! wiring errors exit non-zero.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use persist::{FileExportSink, DEFAULT_EXPORT_PATH};
use pipeline::{EvidenceSource, DEFAULT_CHOICE};
use sources::{HttpEvidenceSource, MockEvidenceSource};
use steps::Orchestrator;

#[derive(Debug, Parser)]
#[command(name = "inquest", about = "Nine-stage evidence pipeline", version)]
struct Cli {
    /// The query to thread through the pipeline.
    query: String,

    /// Choice recorded by the CHOOSE step.
    #[arg(long, default_value = DEFAULT_CHOICE)]
    choice: String,

    /// Path the ALLNIGHT export is written to.
    #[arg(long, default_value = DEFAULT_EXPORT_PATH)]
    export: PathBuf,

    /// Base URL of an HTTP evidence feed; the built-in mock feed is used
    /// when absent.
    #[arg(long)]
    source_url: Option<String>,

    /// Tier label recorded on every run span.
    #[arg(long, default_value = steps::DEFAULT_TIER)]
    tier: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let source: Arc<dyn EvidenceSource> = match &cli.source_url {
        Some(url) => Arc::new(HttpEvidenceSource::new(url.as_str())),
        None => Arc::new(MockEvidenceSource::new()),
    };
    let sink = Arc::new(FileExportSink::new(&cli.export));

    let mut orchestrator = Orchestrator::new(source, sink).with_tier(cli.tier.as_str());
    let results = orchestrator.run(&cli.query, &cli.choice).await;

    println!("{}", serde_json::to_string_pretty(&results)?);
    tracing::info!(export = %cli.export.display(), "run complete");
    Ok(())
}
