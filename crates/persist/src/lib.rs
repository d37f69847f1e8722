//! Export persistence infrastructure.
//!
//! Implements [`pipeline::ExportSink`] with two backends: [`FileExportSink`]
//! writes the export as one pretty-printed JSON document to a named file;
//! [`MemoryExportSink`] keeps the last export in memory for tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use pipeline::{ExportError, ExportSink};

/// Default export file name.
pub const DEFAULT_EXPORT_PATH: &str = "inquest_export.json";

// ---------------------------------------------------------------------------

/// Writes each export over the previous one at a fixed path.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    path: PathBuf,
}

impl FileExportSink {
    /// Creates a sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path exports are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileExportSink {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_PATH)
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    async fn persist(&self, export: &Value) -> Result<(), ExportError> {
        let document = serde_json::to_vec_pretty(export)?;
        tokio::fs::write(&self.path, document).await?;
        info!(path = %self.path.display(), "export written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------

/// Keeps the most recent export in memory. Test double.
#[derive(Debug, Default)]
pub struct MemoryExportSink {
    last: Mutex<Option<Value>>,
}

impl MemoryExportSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently persisted export, if any.
    pub fn last(&self) -> Option<Value> {
        self.last.lock().map(|guard| guard.clone()).unwrap_or(None)
    }
}

#[async_trait]
impl ExportSink for MemoryExportSink {
    async fn persist(&self, export: &Value) -> Result<(), ExportError> {
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some(export.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn file_sink_writes_a_readable_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        let sink = FileExportSink::new(&path);
        let export = json!({"state": {"logs": []}, "dag": {"nodes": [], "edges": []}});

        sink.persist(&export).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, export);
        assert!(parsed.get("state").is_some());
        assert!(parsed.get("dag").is_some());
    }

    #[tokio::test]
    async fn file_sink_surfaces_io_errors_as_values() {
        let sink = FileExportSink::new("/nonexistent-dir/export.json");
        let result = sink.persist(&json!({})).await;
        assert!(matches!(result, Err(ExportError::Io(_))));
    }

    #[tokio::test]
    async fn memory_sink_keeps_the_last_export() {
        let sink = MemoryExportSink::new();
        assert!(sink.last().is_none());
        sink.persist(&json!({"run": 1})).await.unwrap();
        sink.persist(&json!({"run": 2})).await.unwrap();
        assert_eq!(sink.last(), Some(json!({"run": 2})));
    }
}
