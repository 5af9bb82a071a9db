use crate::site::SiteSpec;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// One site's configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub site: SiteSection,
    #[serde(default)]
    pub crawl: CrawlSection,
}

/// Static per-site tuning (`[site]` table).
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSection {
    /// Site identifier stamped onto every extracted book.
    pub source: String,

    /// Seed URL for the crawl.
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Host to scope the crawl to. Defaults to the base URL's host.
    pub domain: Option<String>,

    /// Native-currency to target-currency factor.
    #[serde(rename = "convert-rate", default = "default_convert_rate")]
    pub convert_rate: f64,

    /// URLs fetched concurrently per round.
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between rounds (milliseconds).
    #[serde(rename = "round-delay-ms", default = "default_round_delay_ms")]
    pub round_delay_ms: u64,

    /// Headers sent with every request to this site.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Precomputed pagination URLs seeded alongside the base URL.
    #[serde(rename = "extra-seeds", default)]
    pub extra_seeds: Vec<String>,
}

/// Engine tuning (`[crawl]` table), all optional.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSection {
    /// Per-request timeout (milliseconds).
    #[serde(rename = "fetch-timeout-ms", default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Cumulative fetch failures tolerated before the crawl aborts.
    #[serde(rename = "error-threshold", default = "default_error_threshold")]
    pub error_threshold: u32,

    /// Checkpoint every N processed pages; 0 disables checkpointing.
    #[serde(rename = "checkpoint-every", default = "default_checkpoint_every")]
    pub checkpoint_every: u64,

    /// Directory checkpoint artifacts are written to.
    #[serde(rename = "checkpoint-dir", default = "default_checkpoint_dir")]
    pub checkpoint_dir: String,
}

fn default_convert_rate() -> f64 {
    1.0
}

fn default_batch_size() -> usize {
    50
}

fn default_round_delay_ms() -> u64 {
    1000
}

fn default_fetch_timeout_ms() -> u64 {
    20_000
}

fn default_error_threshold() -> u32 {
    25
}

fn default_checkpoint_every() -> u64 {
    25
}

fn default_checkpoint_dir() -> String {
    "checkpoints".to_string()
}

impl Default for CrawlSection {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
            error_threshold: default_error_threshold(),
            checkpoint_every: default_checkpoint_every(),
            checkpoint_dir: default_checkpoint_dir(),
        }
    }
}

/// Runtime engine settings derived from a [`CrawlSection`].
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub fetch_timeout: Duration,
    pub error_threshold: u32,
    pub checkpoint_every: u64,
    pub checkpoint_dir: PathBuf,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        CrawlSection::default().settings()
    }
}

impl CrawlSection {
    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
            error_threshold: self.error_threshold,
            checkpoint_every: self.checkpoint_every,
            checkpoint_dir: PathBuf::from(&self.checkpoint_dir),
        }
    }
}

impl SiteConfig {
    /// Builds the [`SiteSpec`] an adapter hands to the engine.
    ///
    /// Must only be called on a validated config: the domain fallback assumes
    /// the base URL parses and has a host.
    pub fn site_spec(&self) -> SiteSpec {
        let domain = match &self.site.domain {
            Some(d) => d.to_lowercase(),
            None => ::url::Url::parse(&self.site.base_url)
                .ok()
                .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
                .unwrap_or_default(),
        };

        let mut spec = SiteSpec::new(&self.site.source, &self.site.base_url, domain);
        spec.convert_rate = self.site.convert_rate;
        spec.batch_size = self.site.batch_size;
        spec.round_delay = Duration::from_millis(self.site.round_delay_ms);
        spec.extra_seeds = self.site.extra_seeds.clone();
        if !self.site.headers.is_empty() {
            spec.request_headers = self.site.headers.clone();
        }
        spec
    }

    /// Engine settings for this site's crawl.
    pub fn crawl_settings(&self) -> CrawlSettings {
        self.crawl.settings()
    }
}
