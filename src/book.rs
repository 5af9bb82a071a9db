//! Canonical catalog entities
//!
//! [`RawRecord`] is what a site adapter pulls out of one listing page before
//! any validation; [`Book`] is the validated, immutable entry the crawl
//! produces. Field names follow the downstream catalog schema.

use serde::{Deserialize, Serialize};

/// Unvalidated key-value data extracted from a single listing page.
///
/// Adapters fill in whatever the page offers; only `url` and `source` are
/// known up front. The extraction pipeline decides whether the record is
/// complete enough to become a [`Book`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub url: String,
    pub source: String,
    pub title: Option<String>,
    /// Price text in the site's native currency, as scraped (e.g. "12.50").
    /// Adapters strip currency symbols; the pipeline parses the number.
    pub price: Option<String>,
    pub instock: Option<bool>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub description: Option<String>,
}

impl RawRecord {
    /// Starts a record for a listing page. Adapters chain field assignments
    /// onto this.
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
            ..Self::default()
        }
    }
}

/// A validated catalog entry.
///
/// `price` is always in the target currency: the adapter's convert rate has
/// already been applied. Instances are immutable once constructed by the
/// extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub price: f64,
    pub url: String,
    pub instock: bool,
    /// Site identifier this book was scraped from.
    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.author {
            Some(author) => write!(f, "{} by {} - {:.2}", self.title, author, self.price),
            None => write!(f, "{} - {:.2}", self.title, self.price),
        }
    }
}
