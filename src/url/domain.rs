use url::Url;

/// Extracts the lowercase host from a URL.
///
/// Returns None for URLs without a host (e.g. `data:` URIs), which the
/// crawler never follows anyway.
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `url` is within the crawl's scope domain.
///
/// Hosts are compared case-insensitively with a leading `www.` stripped from
/// both sides, so `https://www.store.test/x` is in scope for a crawl of
/// `store.test`. Subdomains other than `www` are out of scope: catalog sites
/// host carts and CDNs there, not listings.
pub fn in_domain(url: &Url, scope: &str) -> bool {
    match extract_domain(url) {
        Some(host) => strip_www(&host) == strip_www(&scope.to_lowercase()),
        None => false,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}
