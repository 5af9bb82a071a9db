//! Batched HTTP fetching
//!
//! One round of URLs is fetched concurrently behind a single join barrier:
//! the round completes only when every request has settled. A slow host can
//! stall the round, but failure accounting stays trivial and the site never
//! sees more than `batch_size` requests in flight.
//!
//! Failure taxonomy:
//! - HTTP 429 / 503 is a hard failure: the site is throttling or blocking us,
//!   and retrying against an active block makes things worse. The whole
//!   crawl for this site aborts.
//! - Timeouts, network errors, and other non-success statuses are soft
//!   failures: logged, counted, crawl continues.
//! - Cumulative soft+hard failures past the threshold trip the circuit
//!   breaker, which aborts exactly like a hard failure; sustained
//!   degradation is treated as a block.

use crate::{CrawlError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinSet;

/// Outcome of fetching one URL. Transient: lives only for the round that
/// produced it.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// HTTP success with the body captured.
    Success { url: String, body: String },

    /// Timeout, network error, or unexpected status. Counted, not fatal.
    SoftFailure { url: String, reason: String },

    /// HTTP 429 or 503: the site is actively refusing us.
    HardFailure { url: String, status: u16 },
}

impl FetchOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } => url,
            Self::SoftFailure { url, .. } => url,
            Self::HardFailure { url, .. } => url,
        }
    }
}

/// Builds the HTTP client a site's crawl runs on.
///
/// The site's request headers and timeout are baked in as defaults so every
/// fetch in every round shares one connection pool and one configuration.
pub fn build_http_client(
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> std::result::Result<Client, reqwest::Error> {
    let mut default_headers = HeaderMap::new();
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                default_headers.insert(name, value);
            }
            _ => {
                tracing::warn!("Skipping malformed request header '{}'", name);
            }
        }
    }

    Client::builder()
        .default_headers(default_headers)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches rounds of URLs and keeps the site's failure ledger.
pub struct BatchFetcher {
    client: Client,
    failures: u32,
    threshold: u32,
}

impl BatchFetcher {
    pub fn new(
        headers: &HashMap<String, String>,
        timeout: Duration,
        threshold: u32,
    ) -> Result<Self> {
        let client = build_http_client(headers, timeout)?;
        Ok(Self {
            client,
            failures: 0,
            threshold,
        })
    }

    /// Total soft + hard failures recorded so far this crawl.
    pub fn failure_count(&self) -> u32 {
        self.failures
    }

    /// Fetches one round of URLs concurrently and waits for all of them.
    ///
    /// Every request is spawned up front and the barrier drains them all;
    /// a timeout on one request never cancels its siblings. Failures are
    /// merged into the ledger sequentially after the barrier, then:
    ///
    /// * any hard failure in the round aborts with [`CrawlError::Blocked`]
    /// * a ledger past the threshold aborts with [`CrawlError::BreakerTripped`]
    ///
    /// Either abort discards the round's results; Books from prior rounds are
    /// unaffected because the orchestrator owns them.
    pub async fn fetch_batch(&mut self, urls: Vec<String>) -> Result<Vec<FetchOutcome>> {
        let mut tasks = JoinSet::new();
        for url in urls {
            let client = self.client.clone();
            tasks.spawn(async move { fetch_page(&client, url).await });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::error!("Fetch task panicked: {}", e),
            }
        }

        let mut first_hard: Option<(String, u16)> = None;
        for outcome in &outcomes {
            match outcome {
                FetchOutcome::Success { url, .. } => {
                    tracing::debug!("Fetched {}", url);
                }
                FetchOutcome::SoftFailure { url, reason } => {
                    self.failures += 1;
                    tracing::warn!(
                        "Fetch failed for {}: {} ({} failures so far)",
                        url,
                        reason,
                        self.failures
                    );
                }
                FetchOutcome::HardFailure { url, status } => {
                    self.failures += 1;
                    tracing::error!("HTTP {} from {}: site is blocking us", status, url);
                    if first_hard.is_none() {
                        first_hard = Some((url.clone(), *status));
                    }
                }
            }
        }

        if let Some((url, status)) = first_hard {
            return Err(CrawlError::Blocked { url, status });
        }

        if self.failures > self.threshold {
            return Err(CrawlError::BreakerTripped {
                failures: self.failures,
                threshold: self.threshold,
            });
        }

        Ok(outcomes)
    }
}

async fn fetch_page(client: &Client, url: String) -> FetchOutcome {
    match client.get(&url).send().await {
        Ok(response) => {
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE
            {
                return FetchOutcome::HardFailure {
                    url,
                    status: status.as_u16(),
                };
            }

            if !status.is_success() {
                return FetchOutcome::SoftFailure {
                    url,
                    reason: format!("HTTP {}", status.as_u16()),
                };
            }

            match response.text().await {
                Ok(body) => FetchOutcome::Success { url, body },
                Err(e) => FetchOutcome::SoftFailure {
                    url,
                    reason: format!("Failed to read body: {}", e),
                },
            }
        }
        Err(e) => {
            let reason = if e.is_timeout() {
                "Request timed out".to_string()
            } else if e.is_connect() {
                "Connection failed".to_string()
            } else {
                e.to_string()
            };
            FetchOutcome::SoftFailure { url, reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(threshold: u32) -> BatchFetcher {
        BatchFetcher::new(&HashMap::new(), Duration::from_millis(500), threshold).unwrap()
    }

    #[tokio::test]
    async fn test_success_captures_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(5);
        let outcomes = fetcher
            .fetch_batch(vec![format!("{}/page", server.uri())])
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 1);
        match &outcomes[0] {
            FetchOutcome::Success { body, .. } => assert_eq!(body, "hello"),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(fetcher.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_404_is_soft_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(5);
        let outcomes = fetcher
            .fetch_batch(vec![format!("{}/missing", server.uri())])
            .await
            .unwrap();

        assert!(matches!(outcomes[0], FetchOutcome::SoftFailure { .. }));
        assert_eq!(fetcher.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_429_aborts_the_round() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(5);
        let err = fetcher
            .fetch_batch(vec![format!("{}/x", server.uri())])
            .await
            .unwrap_err();

        match err {
            CrawlError::Blocked { status, .. } => assert_eq!(status, 429),
            other => panic!("expected Blocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_503_aborts_the_round() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(5);
        let err = fetcher
            .fetch_batch(vec![format!("{}/x", server.uri())])
            .await
            .unwrap_err();

        assert!(matches!(err, CrawlError::Blocked { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_round_drains_despite_one_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(5);
        let outcomes = fetcher
            .fetch_batch(vec![
                format!("{}/slow", server.uri()),
                format!("{}/fast", server.uri()),
            ])
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        let successes = outcomes
            .iter()
            .filter(|o| matches!(o, FetchOutcome::Success { .. }))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(fetcher.failure_count(), 1);
    }

    #[tokio::test]
    async fn test_breaker_trips_past_threshold() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut fetcher = fetcher(2);

        // Two failures: under the threshold, crawl continues.
        fetcher
            .fetch_batch(vec![
                format!("{}/a", server.uri()),
                format!("{}/b", server.uri()),
            ])
            .await
            .unwrap();

        // Third failure pushes the ledger past the threshold.
        let err = fetcher
            .fetch_batch(vec![format!("{}/c", server.uri())])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CrawlError::BreakerTripped {
                failures: 3,
                threshold: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_batch_is_ok() {
        let mut fetcher = fetcher(5);
        let outcomes = fetcher.fetch_batch(Vec::new()).await.unwrap();
        assert!(outcomes.is_empty());
    }
}
