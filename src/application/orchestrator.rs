//! Runs every configured source in order and hands each result to the sink

use crate::application::product_source::{ExtractionOutcome, ProductSource};
use crate::infrastructure::RecordSink;
use std::sync::Arc;
use tracing::{error, info};

/// Per-run tally, keyed by source name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    /// Source name and the error that stopped it
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len() + self.failed.len()
    }
}

pub struct Orchestrator {
    sources: Vec<Box<dyn ProductSource>>,
    sink: Arc<dyn RecordSink>,
}

impl Orchestrator {
    pub fn new(sources: Vec<Box<dyn ProductSource>>, sink: Arc<dyn RecordSink>) -> Self {
        Self { sources, sink }
    }

    /// Extract each source sequentially. One failing source never stops the rest.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for source in &self.sources {
            let name = source.name();
            info!("🔍 Extracting product from source '{}'", name);

            let written = match source.extract().await {
                Ok(ExtractionOutcome::Accepted(record)) => {
                    let result = self.sink.write(name, Some(&record)).await;
                    if result.is_ok() {
                        summary.accepted.push(name.to_string());
                    }
                    result
                }
                Ok(ExtractionOutcome::Rejected { diagnostics }) => {
                    info!("Source '{}' rejected with {} diagnostic(s)", name, diagnostics.len());
                    let result = self.sink.write(name, None).await;
                    if result.is_ok() {
                        summary.rejected.push(name.to_string());
                    }
                    result
                }
                Err(e) => {
                    error!("❌ Error processing source '{}': {}", name, e);
                    summary.failed.push((name.to_string(), e.to_string()));
                    self.sink.write(name, None).await
                }
            };

            if let Err(e) = written {
                error!("❌ Failed to write output for source '{}': {:#}", name, e);
                if !summary.failed.iter().any(|(failed, _)| failed == name) {
                    summary.failed.push((name.to_string(), format!("{e:#}")));
                }
            }
        }

        info!(
            "Run complete: {} accepted, {} rejected, {} failed",
            summary.accepted.len(),
            summary.rejected.len(),
            summary.failed.len()
        );
        summary
    }
}
