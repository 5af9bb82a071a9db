//! Site configuration loading
//!
//! Per-site tuning lives in small TOML files. Loading parses the file,
//! validates it, and turns it into the [`SiteSpec`](crate::site::SiteSpec)
//! handed to an adapter plus the [`CrawlSettings`] the orchestrator runs
//! with.
//!
//! # Example
//!
//! ```no_run
//! use bindery::config::load_site_config;
//! use std::path::Path;
//!
//! let config = load_site_config(Path::new("sites/salafi.toml")).unwrap();
//! println!("Crawling {} in batches of {}", config.site.source, config.site.batch_size);
//! ```

mod parser;
mod types;
mod validation;

pub use parser::{load_site_config, parse_site_config};
pub use types::{CrawlSection, CrawlSettings, SiteConfig, SiteSection};
pub use validation::validate;
