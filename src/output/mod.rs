//! Output boundary
//!
//! The crawl engine does not own persistence. It hands its results to two
//! narrow collaborator interfaces: a [`BookSink`] that receives the final
//! Book collection for a source (replace-all semantics: the downstream
//! store deletes prior records for the source and inserts the new batch),
//! and a [`StatusSink`] that receives one [`SiteStatus`] per finished crawl
//! for monitoring. A JSON file implementation of the book side lives in
//! [`json`].

mod json;

pub use json::JsonBookSink;

use crate::book::Book;
use crate::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Per-site crawl outcome handed to the monitoring collaborator.
#[derive(Debug, Clone)]
pub struct SiteStatus {
    pub source: String,
    pub last_crawled: DateTime<Utc>,
    /// The systemic error that aborted the crawl, if any.
    pub error: Option<String>,
    pub duration: Duration,
    pub total_books: usize,
}

/// Receives a site's complete Book collection.
///
/// Called once per crawl, on DONE and on ABORTED alike; partial results
/// from an aborted crawl are still valid output.
pub trait BookSink: Send {
    fn replace(&mut self, source: &str, books: &[Book]) -> Result<()>;
}

/// Receives the per-site status record after every crawl.
pub trait StatusSink: Send {
    fn record(&mut self, status: &SiteStatus) -> Result<()>;
}

/// Status sink that only logs. The default when no monitoring collaborator
/// is wired up.
#[derive(Debug, Default)]
pub struct LogStatusSink;

impl StatusSink for LogStatusSink {
    fn record(&mut self, status: &SiteStatus) -> Result<()> {
        match &status.error {
            Some(error) => tracing::warn!(
                "Crawl of {} aborted after {:?} with {} books: {}",
                status.source,
                status.duration,
                status.total_books,
                error
            ),
            None => tracing::info!(
                "Crawl of {} finished in {:?} with {} books",
                status.source,
                status.duration,
                status.total_books
            ),
        }
        Ok(())
    }
}
