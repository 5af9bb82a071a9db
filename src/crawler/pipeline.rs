//! Extraction pipeline
//!
//! Listing pages go adapter → [`RawRecord`] → validation → [`Book`]. A page
//! that fails extraction or validation is skipped with a warning; it never
//! aborts the crawl. Currency conversion happens exactly once, here.

use crate::book::{Book, RawRecord};
use crate::site::SiteAdapter;
use scraper::Html;
use std::sync::Arc;
use thiserror::Error;

/// Why a raw record failed to become a Book.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("missing title")]
    MissingTitle,

    #[error("missing price")]
    MissingPrice,

    #[error("malformed price '{0}'")]
    MalformedPrice(String),

    #[error("negative price {0}")]
    NegativePrice(f64),
}

/// Validates a raw record and constructs the canonical Book.
///
/// Required: non-empty title, parseable non-negative price. `instock`
/// defaults to false when the adapter could not determine it. The native
/// price is multiplied by `convert_rate` and rounded to cents.
pub fn validate_record(record: RawRecord, convert_rate: f64) -> Result<Book, ValidationError> {
    let title = match record.title {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => return Err(ValidationError::MissingTitle),
    };

    let price_text = record.price.ok_or(ValidationError::MissingPrice)?;
    let native: f64 = price_text
        .trim()
        .parse()
        .map_err(|_| ValidationError::MalformedPrice(price_text.clone()))?;
    if !native.is_finite() || native < 0.0 {
        return Err(ValidationError::NegativePrice(native));
    }

    let price = (native * convert_rate * 100.0).round() / 100.0;

    Ok(Book {
        title,
        price,
        url: record.url,
        instock: record.instock.unwrap_or(false),
        source: record.source,
        image: record.image,
        author: record.author,
        publisher: record.publisher,
        description: record.description,
    })
}

/// Runs adapter extraction and validation over listing pages.
pub struct ExtractionPipeline {
    adapter: Arc<dyn SiteAdapter>,
}

impl ExtractionPipeline {
    pub fn new(adapter: Arc<dyn SiteAdapter>) -> Self {
        Self { adapter }
    }

    /// Processes one fetched listing page.
    ///
    /// Returns `None` when the adapter decides the page is not a real product
    /// (benign) or when validation rejects the record (logged as a warning).
    pub fn process(&self, doc: &Html, url: &str) -> Option<Book> {
        let record = match self.adapter.extract(doc, url) {
            Some(record) => record,
            None => {
                tracing::debug!("No product data on {}", url);
                return None;
            }
        };

        match validate_record(record, self.adapter.spec().convert_rate) {
            Ok(book) => {
                tracing::debug!("Extracted {}", book);
                Some(book)
            }
            Err(e) => {
                tracing::warn!("Dropping record from {}: {}", url, e);
                None
            }
        }
    }
}
