//! Configuration infrastructure
//!
//! The source list, HTTP behaviour, logging and output location live in one
//! JSON file. Every section has defaults so a partial file loads; the
//! defaults reproduce the three stock sources.

#![allow(clippy::derivable_impls)]

use crate::infrastructure::parsing::{PrestashopSelectors, ShopifySelectors};
use crate::infrastructure::simple_http_client::HttpClientConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sources to extract, in run order
    pub sources: Vec<SourceConfig>,
    pub http: HttpClientConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// One configured product source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Identifying name; also keys the sink output
    pub name: String,
    /// Product page URL
    pub url: String,
    pub kind: SourceKind,
}

/// Extraction strategy for a source, chosen at configuration time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceKind {
    /// Open Graph meta tags plus a `var meta = {...}` script blob with variants
    ShopifyMeta {
        #[serde(default)]
        selectors: ShopifySelectors,
    },
    /// Open Graph meta tags, gallery links and an inline product id assignment
    PrestashopMeta {
        #[serde(default)]
        selectors: PrestashopSelectors,
    },
    /// Product data from a GraphQL search endpoint
    GraphqlApi {
        api_url: String,
        /// Site origin used for the request origin header and image URLs
        base_url: String,
        #[serde(default)]
        price_mapping: PriceMapping,
    },
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ShopifyMeta { .. } => "shopify_meta",
            Self::PrestashopMeta { .. } => "prestashop_meta",
            Self::GraphqlApi { .. } => "graphql_api",
        }
    }
}

/// How the GraphQL source maps its two prices onto the record.
///
/// The API reports a retail (list) price and a minimum final (effective) price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMapping {
    /// `price` = retail, `prices`/`sale_prices` = effective
    #[default]
    RetailAsPrice,
    /// `price` = effective, `prices` = retail, `sale_prices` = effective
    EffectiveAsPrice,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; relative to the executable when unset
    pub log_dir: Option<PathBuf>,

    /// Log file name inside `log_dir`
    pub file_name: String,
}

/// Where extracted records are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Appended to the source name to form the file name
    pub file_suffix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            http: HttpClientConfig::default(),
            logging: LoggingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(defaults::OUTPUT_DIRECTORY),
            file_suffix: defaults::OUTPUT_FILE_SUFFIX.to_string(),
        }
    }
}

/// The stock sources: one of each kind
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "foreign_fortune".to_string(),
            url: sources::FOREIGN_FORTUNE_URL.to_string(),
            kind: SourceKind::ShopifyMeta {
                selectors: ShopifySelectors::default(),
            },
        },
        SourceConfig {
            name: "lechocolat".to_string(),
            url: sources::LECHOCOLAT_URL.to_string(),
            kind: SourceKind::PrestashopMeta {
                selectors: PrestashopSelectors::default(),
            },
        },
        SourceConfig {
            name: "trader_joes".to_string(),
            url: sources::TRADER_JOES_URL.to_string(),
            kind: SourceKind::GraphqlApi {
                api_url: sources::TRADER_JOES_API_URL.to_string(),
                base_url: sources::TRADER_JOES_BASE_URL.to_string(),
                price_mapping: PriceMapping::default(),
            },
        },
    ]
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("product-harvester");
        Ok(config_dir)
    }

    /// Manager for the default config file in the user config directory
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("product_harvester_config.json");
        Ok(Self { config_path })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load configuration from file, creating default if it doesn't exist.
    ///
    /// A file that exists but does not parse is an error; it is never replaced.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;
        let config = serde_json::from_str::<AppConfig>(&content)
            .with_context(|| format!("Invalid configuration file: {:?}", self.config_path))?;

        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}

/// Stock source URLs
pub mod sources {
    pub const FOREIGN_FORTUNE_URL: &str =
        "https://foreignfortune.com/collections/foreign-accesories/products/foreign-fortune-shades";

    pub const LECHOCOLAT_URL: &str =
        "https://www.lechocolat-alainducasse.com/uk/soveria-candied-fruit-citrus-trio#/52-size-250g";

    pub const TRADER_JOES_URL: &str =
        "https://www.traderjoes.com/home/products/pdp/peach-raspberry-crisp-079424";

    pub const TRADER_JOES_BASE_URL: &str = "https://www.traderjoes.com";

    pub const TRADER_JOES_API_URL: &str = "https://www.traderjoes.com/api/graphql";
}

/// Default configuration values
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "info";

    /// Default JSON format setting
    pub const LOG_JSON_FORMAT: bool = false;

    /// Default console output setting
    pub const LOG_CONSOLE_OUTPUT: bool = true;

    /// Default file output setting
    pub const LOG_FILE_OUTPUT: bool = false;

    pub const LOG_FILE_NAME: &str = "product-harvester.log";

    pub const OUTPUT_DIRECTORY: &str = ".";

    pub const OUTPUT_FILE_SUFFIX: &str = "_output.json";
}
