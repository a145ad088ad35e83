//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Cache persistence settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// URL grouping and date-inference settings
    #[serde(default)]
    pub grouping: GroupingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.service.trim().is_empty() {
            return Err(AppError::validation("crawler.service is empty"));
        }
        if !self.crawler.metadata_suffix.starts_with('.') {
            return Err(AppError::validation(
                "crawler.metadata_suffix must start with '.'",
            ));
        }
        if self.cache.namespace.trim().is_empty() {
            return Err(AppError::validation("cache.namespace is empty"));
        }
        if self.grouping.min_group_size < 2 {
            return Err(AppError::validation("grouping.min_group_size must be >= 2"));
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Access-service name whose dataset URLs are collected
    #[serde(default = "defaults::service")]
    pub service: String,

    /// Suffix appended to a dataset access URL to derive its
    /// companion metadata-document URL
    #[serde(default = "defaults::metadata_suffix")]
    pub metadata_suffix: String,

    /// Fetch metadata-document bodies during the crawl. When false the
    /// crawl only inventories URLs; bodies can be fetched on demand later.
    #[serde(default)]
    pub fetch_bodies: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            service: defaults::service(),
            metadata_suffix: defaults::metadata_suffix(),
            fetch_bodies: false,
        }
    }
}

/// Cache persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding persisted cache files
    #[serde(default = "defaults::cache_dir")]
    pub dir: String,

    /// Basename prefix for this cache instance's files. Independent
    /// crawls must use distinct namespaces.
    #[serde(default = "defaults::namespace")]
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: defaults::cache_dir(),
            namespace: defaults::namespace(),
        }
    }
}

/// URL grouping and date-inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Prepend the host to the signature so identical paths on
    /// different servers form distinct groups
    #[serde(default)]
    pub include_host: bool,

    /// Smallest group for which date inference is attempted
    #[serde(default = "defaults::min_group_size")]
    pub min_group_size: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            include_host: false,
            min_group_size: defaults::min_group_size(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        format!("catcrawl/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn request_delay() -> u64 {
        0
    }

    pub fn service() -> String {
        "OPeNDAP".to_string()
    }

    pub fn metadata_suffix() -> String {
        ".ddx".to_string()
    }

    pub fn cache_dir() -> String {
        "cache".to_string()
    }

    pub fn namespace() -> String {
        "crawl".to_string()
    }

    pub fn min_group_size() -> usize {
        2
    }
}
