//! Crawl frontier: pending stack plus visited set
//!
//! The pending collection is a stack on purpose. Popping the most recently
//! discovered links first biases the crawl toward depth, which finishes
//! catalog sections before wandering. The downstream catalog relies on this
//! traversal order; do not change it to a queue.

use std::collections::HashSet;

/// Ordered collection of URLs still to fetch, with deduplication against
/// everything already fetched or already queued.
///
/// All mutation happens between rounds on the orchestrator's single task, so
/// no interior locking is needed.
#[derive(Debug, Default)]
pub struct Frontier {
    pending: Vec<String>,
    pending_set: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes pending with the base URL followed by any extra seeds.
    ///
    /// No-op if the frontier already holds state (i.e. it was restored from a
    /// checkpoint).
    pub fn seed(&mut self, base_url: &str, extra_seeds: &[String]) {
        if !self.pending.is_empty() || !self.visited.is_empty() {
            tracing::debug!("Frontier already populated, skipping seed");
            return;
        }
        self.push(base_url);
        for seed in extra_seeds {
            self.push(seed);
        }
    }

    /// Rebuilds frontier state from a checkpoint snapshot.
    pub fn restore(&mut self, pending: Vec<String>, visited: HashSet<String>) {
        self.pending_set = pending.iter().cloned().collect();
        self.pending = pending;
        self.visited = visited;
        // A checkpoint written mid-round can list a URL as both pending and
        // visited; visited wins so it is never fetched twice.
        self.pending.retain(|url| !self.visited.contains(url));
        self.pending_set.retain(|url| !self.visited.contains(url));
    }

    /// Removes and returns up to `n` URLs from the end of pending (stack
    /// order), marking each visited immediately so a URL can never be drawn
    /// twice even if a later round re-offers it.
    ///
    /// An empty result means the crawl is complete.
    pub fn draw_batch(&mut self, n: usize) -> Vec<String> {
        let mut batch = Vec::with_capacity(n);
        while batch.len() < n {
            let Some(url) = self.pending.pop() else {
                break;
            };
            self.pending_set.remove(&url);
            // Stale entries can exist after a restore; skip, don't fetch.
            if self.visited.contains(&url) {
                continue;
            }
            self.visited.insert(url.clone());
            batch.push(url);
        }
        batch
    }

    /// Adds a URL to pending iff it is neither visited nor already queued.
    ///
    /// Domain scoping and the adapter's ignore filter run before this, in the
    /// link harvester. Returns true if the URL was accepted.
    pub fn offer(&mut self, url: &str) -> bool {
        if self.visited.contains(url) || self.pending_set.contains(url) {
            return false;
        }
        self.push(url);
        true
    }

    fn push(&mut self, url: &str) {
        if self.pending_set.insert(url.to_string()) {
            self.pending.push(url.to_string());
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending URLs in insertion order, for checkpointing.
    pub fn pending_snapshot(&self) -> &[String] {
        &self.pending
    }

    /// Visited set, for checkpointing.
    pub fn visited_snapshot(&self) -> &HashSet<String> {
        &self.visited
    }
}
