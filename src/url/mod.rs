//! URL handling for the crawl engine
//!
//! Provides host extraction and the domain-scoping predicate that keeps the
//! Frontier inside one site's catalog.

mod domain;

pub use domain::{extract_domain, in_domain};
