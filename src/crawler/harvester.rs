//! Link discovery
//!
//! Every successfully fetched page, listing pages included, is scanned for
//! anchor elements. Hrefs are resolved against the page URL, scoped to the
//! crawl's domain, passed through the adapter's ignore filter, and offered to
//! the frontier. Offers are idempotent: harvesting the same page twice never
//! re-queues a URL.

use crate::crawler::frontier::Frontier;
use crate::site::SiteAdapter;
use crate::url::in_domain;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

/// Extracts all followable links from a parsed page, resolved to absolute
/// form.
///
/// Skips anchors with a `download` attribute, non-HTTP(S) schemes
/// (`javascript:`, `mailto:`, `tel:`, `data:`), and fragment-only hrefs.
pub fn extract_links(doc: &Html, base_url: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    if let Ok(anchor) = Selector::parse("a[href]") {
        for element in doc.select(&anchor) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, base_url) {
                    links.push(absolute);
                }
            }
        }
    }

    links
}

fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute)
    } else {
        None
    }
}

/// Feeds in-domain, non-ignored links from fetched pages into the frontier.
pub struct LinkHarvester {
    adapter: Arc<dyn SiteAdapter>,
}

impl LinkHarvester {
    pub fn new(adapter: Arc<dyn SiteAdapter>) -> Self {
        Self { adapter }
    }

    /// Harvests one page's links into the frontier.
    ///
    /// Returns how many URLs the frontier accepted.
    pub fn harvest(&self, doc: &Html, page_url: &Url, frontier: &mut Frontier) -> usize {
        let domain = &self.adapter.spec().domain;
        let mut accepted = 0;

        for link in extract_links(doc, page_url) {
            if !in_domain(&link, domain) {
                continue;
            }
            let link_str = link.as_str();
            if self.adapter.should_ignore(link_str) {
                tracing::trace!("Ignoring {}", link_str);
                continue;
            }
            if frontier.offer(link_str) {
                tracing::debug!("Queued {}", link_str);
                accepted += 1;
            }
        }

        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::RawRecord;
    use crate::site::SiteSpec;

    fn base_url() -> Url {
        Url::parse("https://store.test/shelf").unwrap()
    }

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_relative_link_resolved() {
        let doc = parse(r#"<html><body><a href="/product/1">Book</a></body></html>"#);
        let links = extract_links(&doc, &base_url());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].as_str(), "https://store.test/product/1");
    }

    #[test]
    fn test_relative_path_link_resolved_against_page() {
        let doc = parse(r#"<html><body><a href="other">Link</a></body></html>"#);
        let links = extract_links(&doc, &base_url());
        assert_eq!(links[0].as_str(), "https://store.test/other");
    }

    #[test]
    fn test_absolute_link_kept() {
        let doc = parse(r#"<html><body><a href="https://other.test/x">Link</a></body></html>"#);
        let links = extract_links(&doc, &base_url());
        assert_eq!(links[0].as_str(), "https://other.test/x");
    }

    #[test]
    fn test_special_schemes_skipped() {
        let doc = parse(
            r#"<html><body>
            <a href="javascript:void(0)">a</a>
            <a href="mailto:x@store.test">b</a>
            <a href="tel:+123">c</a>
            <a href="data:text/html,hi">d</a>
            </body></html>"#,
        );
        assert!(extract_links(&doc, &base_url()).is_empty());
    }

    #[test]
    fn test_fragment_only_skipped() {
        let doc = parse(r##"<html><body><a href="#reviews">Jump</a></body></html>"##);
        assert!(extract_links(&doc, &base_url()).is_empty());
    }

    #[test]
    fn test_download_attribute_skipped() {
        let doc = parse(r#"<html><body><a href="/catalog.pdf" download>PDF</a></body></html>"#);
        assert!(extract_links(&doc, &base_url()).is_empty());
    }

    struct ShelfAdapter {
        spec: SiteSpec,
    }

    impl ShelfAdapter {
        fn new() -> Self {
            Self {
                spec: SiteSpec::new("store.test", "https://store.test/", "store.test"),
            }
        }
    }

    impl SiteAdapter for ShelfAdapter {
        fn spec(&self) -> &SiteSpec {
            &self.spec
        }

        fn is_listing_url(&self, url: &str) -> bool {
            url.contains("/product/")
        }

        fn should_ignore(&self, url: &str) -> bool {
            url.contains("add-to-cart")
        }

        fn extract(&self, _doc: &Html, _url: &str) -> Option<RawRecord> {
            None
        }
    }

    #[test]
    fn test_harvest_scopes_to_domain() {
        let harvester = LinkHarvester::new(Arc::new(ShelfAdapter::new()));
        let mut frontier = Frontier::new();
        let doc = parse(
            r#"<html><body>
            <a href="/product/1">In domain</a>
            <a href="https://other.test/">Out of domain</a>
            </body></html>"#,
        );

        let accepted = harvester.harvest(&doc, &base_url(), &mut frontier);
        assert_eq!(accepted, 1);
        assert_eq!(frontier.pending_len(), 1);
        assert_eq!(frontier.pending_snapshot()[0], "https://store.test/product/1");
    }

    #[test]
    fn test_harvest_applies_ignore_filter() {
        let harvester = LinkHarvester::new(Arc::new(ShelfAdapter::new()));
        let mut frontier = Frontier::new();
        let doc = parse(r#"<html><body><a href="/product/1?add-to-cart=1">Cart</a></body></html>"#);

        assert_eq!(harvester.harvest(&doc, &base_url(), &mut frontier), 0);
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_harvest_is_idempotent() {
        let harvester = LinkHarvester::new(Arc::new(ShelfAdapter::new()));
        let mut frontier = Frontier::new();
        let doc = parse(r#"<html><body><a href="/product/1">Book</a></body></html>"#);

        assert_eq!(harvester.harvest(&doc, &base_url(), &mut frontier), 1);
        assert_eq!(harvester.harvest(&doc, &base_url(), &mut frontier), 0);
        assert_eq!(frontier.pending_len(), 1);
    }
}
