//! The crawl engine
//!
//! - [`frontier`]: pending stack + visited set with at-most-once dequeue
//! - [`fetcher`]: one round of concurrent fetches behind a join barrier,
//!   with the failure circuit breaker
//! - [`harvester`]: link discovery feeding the frontier
//! - [`pipeline`]: listing extraction, validation, currency conversion
//! - [`orchestrator`]: the state machine tying it together

pub mod fetcher;
pub mod frontier;
pub mod harvester;
pub mod orchestrator;
pub mod pipeline;

pub use fetcher::{build_http_client, BatchFetcher, FetchOutcome};
pub use frontier::Frontier;
pub use harvester::{extract_links, LinkHarvester};
pub use orchestrator::{CrawlOrchestrator, CrawlReport, CrawlState};
pub use pipeline::{validate_record, ExtractionPipeline, ValidationError};
