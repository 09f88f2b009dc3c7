//! Record sinks: where accepted (or rejected) extraction results are written
//!
//! The orchestrator calls the sink once per source. A rejected source is
//! written as `None` so the caller can see which sources failed.

use crate::domain::ProductRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::fs;
use tracing::info;

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn write(&self, name: &str, record: Option<&ProductRecord>) -> Result<()>;
}

/// Serialize `value` as JSON pretty-printed with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Writes one JSON document per source: `<directory>/<name><suffix>`
pub struct JsonFileSink {
    directory: PathBuf,
    file_suffix: String,
}

impl JsonFileSink {
    pub fn new(directory: impl Into<PathBuf>, file_suffix: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_suffix: file_suffix.into(),
        }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}{}", self.file_suffix))
    }
}

#[async_trait]
impl RecordSink for JsonFileSink {
    async fn write(&self, name: &str, record: Option<&ProductRecord>) -> Result<()> {
        fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("Failed to create output directory: {:?}", self.directory))?;

        let path = self.path_for(name);
        let content = to_pretty_json(&record).context("Failed to serialize product record")?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write output file: {path:?}"))?;

        info!("JSON data saved to {:?}", path);
        Ok(())
    }
}

/// Keeps every write in memory, in call order
#[derive(Default)]
pub struct MemorySink {
    writes: Mutex<Vec<(String, Option<ProductRecord>)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all writes so far.
    pub fn writes(&self) -> Vec<(String, Option<ProductRecord>)> {
        self.writes
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn write(&self, name: &str, record: Option<&ProductRecord>) -> Result<()> {
        self.writes
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory sink lock poisoned"))?
            .push((name.to_string(), record.cloned()));
        Ok(())
    }
}
