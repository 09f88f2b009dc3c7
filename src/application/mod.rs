//! Application layer - source adapters and the extraction run
//!
//! Adapters implement [`ProductSource`]; the [`Orchestrator`] drives them in
//! configuration order and writes one result per source to a record sink.

pub mod orchestrator;
pub mod product_source;
pub mod sources;

// Re-export commonly used items
pub use orchestrator::{Orchestrator, RunSummary};
pub use product_source::{
    ExtractionError, ExtractionOutcome, ProductSource, build_source, build_sources, finalize,
};
