//! Crawl orchestration
//!
//! Drives one site's crawl from seeding to a terminal state:
//!
//! ```text
//! SEEDING -> CRAWLING (periodic CHECKPOINTING) -> DRAINING -> DONE
//!                 \-> ABORTED (hard failure / circuit breaker)
//! ```
//!
//! Rounds are strictly sequential; concurrency only exists inside a round,
//! behind the fetcher's join barrier. The frontier, the failure ledger, and
//! the Book accumulator are therefore only ever touched from this one task,
//! after each round has fully settled.

use crate::book::Book;
use crate::checkpoint::CheckpointStore;
use crate::config::CrawlSettings;
use crate::crawler::fetcher::{BatchFetcher, FetchOutcome};
use crate::crawler::frontier::Frontier;
use crate::crawler::harvester::LinkHarvester;
use crate::crawler::pipeline::ExtractionPipeline;
use crate::output::{BookSink, SiteStatus, StatusSink};
use crate::site::SiteAdapter;
use crate::{CrawlError, Result};
use chrono::{DateTime, Utc};
use scraper::Html;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Lifecycle state of one crawl run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Seeding,
    Crawling,
    Draining,
    Done,
    Aborted,
}

/// What one crawl run produced.
///
/// On `Aborted`, `error` carries the triggering failure and `books` still
/// holds everything collected before the abort. Partial results are valid
/// output, not discarded.
#[derive(Debug)]
pub struct CrawlReport {
    pub source: String,
    pub state: CrawlState,
    pub books: Vec<Book>,
    pub error: Option<CrawlError>,
    pub pages_processed: u64,
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn is_aborted(&self) -> bool {
        self.state == CrawlState::Aborted
    }
}

/// Drives a single site's crawl. One orchestrator runs one crawl and is
/// consumed by it; sites in a multi-site run get one orchestrator each,
/// sequentially, so failure accounting never crosses site boundaries.
pub struct CrawlOrchestrator {
    adapter: Arc<dyn SiteAdapter>,
    settings: CrawlSettings,
    frontier: Frontier,
    fetcher: BatchFetcher,
    harvester: LinkHarvester,
    pipeline: ExtractionPipeline,
    checkpoints: Option<CheckpointStore>,
    book_sink: Box<dyn BookSink>,
    status_sink: Box<dyn StatusSink>,
    books: Vec<Book>,
    state: CrawlState,
    pages_processed: u64,
    pages_since_checkpoint: u64,
}

impl CrawlOrchestrator {
    /// Wires up the engine for one site.
    ///
    /// The run identifier for checkpoints is the construction timestamp.
    pub fn new(
        adapter: Arc<dyn SiteAdapter>,
        settings: CrawlSettings,
        book_sink: Box<dyn BookSink>,
        status_sink: Box<dyn StatusSink>,
    ) -> Result<Self> {
        let spec = adapter.spec();
        let fetcher = BatchFetcher::new(
            &spec.request_headers,
            settings.fetch_timeout,
            settings.error_threshold,
        )?;

        let checkpoints = if settings.checkpoint_every > 0 {
            let run_id = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
            Some(CheckpointStore::new(&settings.checkpoint_dir, run_id))
        } else {
            None
        };

        Ok(Self {
            harvester: LinkHarvester::new(Arc::clone(&adapter)),
            pipeline: ExtractionPipeline::new(Arc::clone(&adapter)),
            adapter,
            settings,
            frontier: Frontier::new(),
            fetcher,
            checkpoints,
            book_sink,
            status_sink,
            books: Vec::new(),
            state: CrawlState::Seeding,
            pages_processed: 0,
            pages_since_checkpoint: 0,
        })
    }

    /// Runs the crawl to a terminal state.
    ///
    /// `resume` names a previous run's checkpoint identifier; when given, the
    /// frontier and Book collection are rehydrated from it instead of seeding
    /// from the base URL. The final collection is flushed to the book sink
    /// and a status record emitted on both DONE and ABORTED.
    pub async fn run(mut self, resume: Option<&str>) -> Result<CrawlReport> {
        let started = Instant::now();
        let spec = self.adapter.spec().clone();

        if let Some(run_id) = resume {
            let checkpoint = CheckpointStore::load(&self.settings.checkpoint_dir, run_id)?;
            tracing::info!(
                "Resuming {} from checkpoint {}: {} pending, {} visited, {} books",
                spec.source,
                run_id,
                checkpoint.pending.len(),
                checkpoint.visited.len(),
                checkpoint.books.len()
            );
            self.books = checkpoint.books;
            self.frontier.restore(checkpoint.pending, checkpoint.visited);
        } else {
            tracing::info!("Seeding crawl of {} from {}", spec.source, spec.base_url);
            self.frontier.seed(&spec.base_url, &spec.extra_seeds);
        }

        self.state = CrawlState::Crawling;
        let mut abort: Option<CrawlError> = None;

        loop {
            let batch = self.frontier.draw_batch(spec.batch_size);
            if batch.is_empty() {
                tracing::info!("Frontier exhausted for {}", spec.source);
                break;
            }

            tracing::info!(
                "Round of {} URLs for {} ({} pending, {} visited, {} books)",
                batch.len(),
                spec.source,
                self.frontier.pending_len(),
                self.frontier.visited_len(),
                self.books.len()
            );

            match self.fetcher.fetch_batch(batch).await {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        if let FetchOutcome::Success { url, body } = outcome {
                            self.process_page(&url, &body);
                        }
                        self.pages_processed += 1;
                        self.pages_since_checkpoint += 1;
                    }
                    self.maybe_checkpoint();
                }
                Err(e) => {
                    tracing::error!("Aborting crawl of {}: {}", spec.source, e);
                    abort = Some(e);
                    break;
                }
            }

            if !self.frontier.is_exhausted() && !spec.round_delay.is_zero() {
                tokio::time::sleep(spec.round_delay).await;
            }
        }

        if abort.is_none() {
            self.state = CrawlState::Draining;
        }

        // Books collected before an abort are still flushed. A failing sink
        // never discards the report: the Books and the original abort error
        // must survive, so sink errors are logged instead of propagated.
        if let Err(e) = self.book_sink.replace(&spec.source, &self.books) {
            tracing::error!("Book sink failed for {}: {}", spec.source, e);
        }

        self.state = if abort.is_some() {
            CrawlState::Aborted
        } else {
            CrawlState::Done
        };

        let duration = started.elapsed();
        let finished_at = Utc::now();
        let status = SiteStatus {
            source: spec.source.clone(),
            last_crawled: finished_at,
            error: abort.as_ref().map(|e| e.to_string()),
            duration,
            total_books: self.books.len(),
        };
        if let Err(e) = self.status_sink.record(&status) {
            tracing::error!("Status sink failed for {}: {}", spec.source, e);
        }

        tracing::info!(
            "Crawl of {} reached {:?}: {} pages, {} books in {:?}",
            spec.source,
            self.state,
            self.pages_processed,
            self.books.len(),
            duration
        );

        Ok(CrawlReport {
            source: spec.source,
            state: self.state,
            books: self.books,
            error: abort,
            pages_processed: self.pages_processed,
            duration,
            finished_at,
        })
    }

    /// Handles one successfully fetched page: extraction if it is a listing,
    /// link harvesting always.
    fn process_page(&mut self, url: &str, body: &str) {
        let page_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("Unparseable page URL {}: {}", url, e);
                return;
            }
        };

        // Parse once; extraction and harvesting share the document.
        let doc = Html::parse_document(body);

        if self.adapter.is_listing_url(url) {
            if let Some(book) = self.pipeline.process(&doc, url) {
                self.books.push(book);
            }
        }

        self.harvester.harvest(&doc, &page_url, &mut self.frontier);
    }

    /// Writes a checkpoint once enough pages have been processed. A failed
    /// write is logged and the crawl carries on.
    fn maybe_checkpoint(&mut self) {
        let Some(store) = &self.checkpoints else {
            return;
        };
        if self.pages_since_checkpoint < self.settings.checkpoint_every {
            return;
        }
        if let Err(e) = store.save(&self.frontier, &self.books) {
            tracing::error!("Checkpoint write failed: {}", e);
        }
        self.pages_since_checkpoint = 0;
    }
}
