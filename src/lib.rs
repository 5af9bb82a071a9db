//! Bindery: a crawl engine for bookstore catalog sites
//!
//! This crate implements a bounded-concurrency, checkpointable frontier
//! crawler. Each target site supplies a [`site::SiteAdapter`] that classifies
//! URLs and extracts raw listing data; the shared engine handles frontier
//! management, batched fetching, link discovery, record validation, currency
//! conversion, and crash-resumable checkpoints.

pub mod book;
pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod output;
pub mod site;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Site is blocking requests: HTTP {status} from {url}")]
    Blocked { url: String, status: u16 },

    #[error("Fetch circuit breaker tripped: {failures} failures (threshold {threshold})")]
    BreakerTripped { failures: u32, threshold: u32 },

    #[error("Checkpoint {run_id} is incomplete: missing {missing}")]
    CheckpointIncomplete { run_id: String, missing: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Output sink error: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use book::{Book, RawRecord};
pub use checkpoint::{CheckpointStore, CrawlCheckpoint};
pub use config::{CrawlSettings, SiteConfig};
pub use crawler::{CrawlOrchestrator, CrawlReport, CrawlState};
pub use output::{BookSink, SiteStatus, StatusSink};
pub use site::{SiteAdapter, SiteSpec};
