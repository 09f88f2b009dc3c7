//! Source adapter capability and the shared accept/reject step
//!
//! Every adapter fetches its own data, builds a candidate record and hands it
//! to [`finalize`], which runs the validator. Fetch and parse failures are
//! returned as [`ExtractionError`] and are fatal to that adapter only.

use crate::application::sources::{GraphqlApiSource, PrestashopMetaSource, ShopifyMetaSource};
use crate::domain::{ProductRecord, validate};
use crate::infrastructure::config::{AppConfig, SourceConfig, SourceKind};
use crate::infrastructure::{FetchError, PageFetcher, ParsingError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Failure that ends one adapter's run
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

/// Result of a completed extraction
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Accepted(ProductRecord),
    /// The candidate failed validation; only the diagnostics survive.
    Rejected { diagnostics: Vec<String> },
}

impl ExtractionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    pub fn into_record(self) -> Option<ProductRecord> {
        match self {
            Self::Accepted(record) => Some(record),
            Self::Rejected { .. } => None,
        }
    }
}

/// A source-specific extraction strategy
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Identifying name, used to key sink output
    fn name(&self) -> &str;

    /// Fetch, extract and validate one product record.
    async fn extract(&self) -> Result<ExtractionOutcome, ExtractionError>;
}

/// Validate a candidate record and decide whether it is accepted.
pub fn finalize(source: &str, record: ProductRecord) -> ExtractionOutcome {
    let diagnostics = validate(&record);
    if diagnostics.is_empty() {
        info!("✅ Source '{}' produced a valid record: {}", source, record.title);
        return ExtractionOutcome::Accepted(record);
    }

    warn!("Validation errors for source '{}':", source);
    for diagnostic in &diagnostics {
        warn!(" - {}", diagnostic);
    }
    ExtractionOutcome::Rejected { diagnostics }
}

/// Build the adapter for one configured source.
pub fn build_source(
    config: &SourceConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> Result<Box<dyn ProductSource>, ParsingError> {
    let source: Box<dyn ProductSource> = match &config.kind {
        SourceKind::ShopifyMeta { selectors } => Box::new(ShopifyMetaSource::new(
            &config.name,
            &config.url,
            selectors,
            fetcher,
        )?),
        SourceKind::PrestashopMeta { selectors } => Box::new(PrestashopMetaSource::new(
            &config.name,
            &config.url,
            selectors,
            fetcher,
        )?),
        SourceKind::GraphqlApi {
            api_url,
            base_url,
            price_mapping,
        } => Box::new(GraphqlApiSource::new(
            &config.name,
            &config.url,
            api_url,
            base_url,
            *price_mapping,
            fetcher,
        )?),
    };
    info!("Configured source '{}' ({})", config.name, config.kind.label());
    Ok(source)
}

/// Build adapters for every configured source, in configuration order.
pub fn build_sources(
    config: &AppConfig,
    fetcher: &Arc<dyn PageFetcher>,
) -> Result<Vec<Box<dyn ProductSource>>, ParsingError> {
    config
        .sources
        .iter()
        .map(|source| build_source(source, Arc::clone(fetcher)))
        .collect()
}
