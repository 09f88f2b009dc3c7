//! Infrastructure layer: configuration, logging, HTTP fetching, HTML and
//! sideband parsing, and record sinks.

pub mod config;
pub mod logging;
pub mod parsing;
pub mod parsing_error;
pub mod record_sink;
pub mod simple_http_client;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager, PriceMapping, SourceConfig, SourceKind};
pub use logging::init_logging_with_config;
pub use parsing::{ParsingError, ParsingResult};
pub use record_sink::{JsonFileSink, MemorySink, RecordSink};
pub use simple_http_client::{FetchError, HttpClient, HttpClientConfig, PageFetcher};
