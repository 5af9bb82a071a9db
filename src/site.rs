//! Per-site adapter contract
//!
//! The crawl engine knows nothing about any particular bookstore's markup.
//! Each site integration implements [`SiteAdapter`]: three classification and
//! extraction hooks plus a [`SiteSpec`] of static tuning the engine reads but
//! does not interpret. The engine only ever holds `Arc<dyn SiteAdapter>`, so
//! adding a site never touches the core.

use crate::book::RawRecord;
use scraper::Html;
use std::collections::HashMap;
use std::time::Duration;

/// Static per-site configuration the crawl engine reads verbatim.
#[derive(Debug, Clone)]
pub struct SiteSpec {
    /// Site identifier stamped onto every Book (e.g. "salafibookstore").
    pub source: String,
    /// Seed URL for the crawl.
    pub base_url: String,
    /// Host the crawl is scoped to; links elsewhere are dropped.
    pub domain: String,
    /// Multiplicative factor from the site's native currency to the catalog's
    /// target currency, applied once at validation time.
    pub convert_rate: f64,
    /// Number of URLs fetched concurrently per round.
    pub batch_size: usize,
    /// Fixed pause between rounds, to stay under the site's rate limit.
    pub round_delay: Duration,
    /// Headers sent with every request to this site.
    pub request_headers: HashMap<String, String>,
    /// Additional seed URLs for catalogs whose pagination is not reachable by
    /// following links (precomputed page URLs).
    pub extra_seeds: Vec<String>,
}

impl SiteSpec {
    /// A spec with the tuning knobs most sites use unchanged: batch of 50,
    /// one second between rounds, a desktop browser User-Agent, no currency
    /// conversion.
    pub fn new(
        source: impl Into<String>,
        base_url: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        let mut request_headers = HashMap::new();
        request_headers.insert(
            "User-Agent".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
        );
        Self {
            source: source.into(),
            base_url: base_url.into(),
            domain: domain.into(),
            convert_rate: 1.0,
            batch_size: 50,
            round_delay: Duration::from_secs(1),
            request_headers,
            extra_seeds: Vec::new(),
        }
    }
}

/// The per-site plug-in the crawl engine drives.
///
/// Implementations must be cheap to call: `is_listing_url` and
/// `should_ignore` run on every discovered link.
pub trait SiteAdapter: Send + Sync {
    /// Static tuning for this site.
    fn spec(&self) -> &SiteSpec;

    /// Whether a fetched page should be run through extraction.
    fn is_listing_url(&self, url: &str) -> bool;

    /// Whether a discovered link should be dropped before it ever enters the
    /// frontier (carts, auth, feeds, asset files, tracking parameters).
    fn should_ignore(&self, url: &str) -> bool;

    /// Parses one listing page into a raw record.
    ///
    /// Returns `None` when the page turns out not to be a real product (the
    /// title cannot be found); that is a benign outcome, not an error.
    /// Missing optional fields must be left as `None`, never raised.
    fn extract(&self, doc: &Html, url: &str) -> Option<RawRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_tuning() {
        let spec = SiteSpec::new("store", "https://store.test/", "store.test");
        assert_eq!(spec.convert_rate, 1.0);
        assert_eq!(spec.batch_size, 50);
        assert!(spec.extra_seeds.is_empty());
        assert!(spec.request_headers.contains_key("User-Agent"));
    }
}
