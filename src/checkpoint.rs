//! Durable crawl checkpoints
//!
//! A checkpoint is three artifacts keyed by a run identifier: the pending
//! URL list (newline-delimited, insertion order), the visited URL list
//! (newline-delimited), and the Book collection accumulated so far (JSON).
//! Resume requires all three under the same identifier; a partial
//! checkpoint is never read, because restoring pending without visited would
//! re-fetch the whole site.

use crate::book::Book;
use crate::crawler::frontier::Frontier;
use crate::{CrawlError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot of crawl progress, as loaded from disk.
#[derive(Debug, Clone)]
pub struct CrawlCheckpoint {
    pub pending: Vec<String>,
    pub visited: HashSet<String>,
    pub books: Vec<Book>,
}

/// Writes and reads checkpoint artifacts for one crawl run.
pub struct CheckpointStore {
    dir: PathBuf,
    run_id: String,
}

impl CheckpointStore {
    /// A store writing under `dir` with the given run identifier
    /// (conventionally the crawl's start timestamp).
    pub fn new(dir: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            run_id: run_id.into(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Persists the frontier and the Books collected so far.
    ///
    /// Artifacts for the same run identifier are overwritten: only the latest
    /// snapshot matters.
    pub fn save(&self, frontier: &Frontier, books: &[Book]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let pending = frontier.pending_snapshot().join("\n");
        fs::write(self.pending_path(), pending)?;

        let visited = frontier
            .visited_snapshot()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(self.visited_path(), visited)?;

        let json = serde_json::to_vec_pretty(books)?;
        fs::write(self.books_path(), json)?;

        tracing::info!(
            "Checkpointed run {}: {} pending, {} visited, {} books",
            self.run_id,
            frontier.pending_len(),
            frontier.visited_len(),
            books.len()
        );
        Ok(())
    }

    /// Loads the checkpoint for `run_id` from `dir`.
    ///
    /// Errors with [`CrawlError::CheckpointIncomplete`] if any of the three
    /// artifacts is absent; nothing is read in that case.
    pub fn load(dir: &Path, run_id: &str) -> Result<CrawlCheckpoint> {
        let store = Self::new(dir, run_id);

        for (path, artifact) in [
            (store.pending_path(), "pending list"),
            (store.visited_path(), "visited list"),
            (store.books_path(), "book collection"),
        ] {
            if !path.exists() {
                return Err(CrawlError::CheckpointIncomplete {
                    run_id: run_id.to_string(),
                    missing: artifact.to_string(),
                });
            }
        }

        let pending = read_lines(&store.pending_path())?;
        let visited = read_lines(&store.visited_path())?.into_iter().collect();
        let books: Vec<Book> = serde_json::from_slice(&fs::read(store.books_path())?)?;

        Ok(CrawlCheckpoint {
            pending,
            visited,
            books,
        })
    }

    fn pending_path(&self) -> PathBuf {
        self.dir.join(format!("pending-{}.txt", self.run_id))
    }

    fn visited_path(&self) -> PathBuf {
        self.dir.join(format!("visited-{}.txt", self.run_id))
    }

    fn books_path(&self) -> PathBuf {
        self.dir.join(format!("books-{}.json", self.run_id))
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    Ok(fs::read_to_string(path)?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book {
            title: "X".to_string(),
            price: 13.0,
            url: "https://s.test/product/1".to_string(),
            instock: true,
            source: "s.test".to_string(),
            image: None,
            author: None,
            publisher: None,
            description: None,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path(), "run-1");

        let mut frontier = Frontier::new();
        frontier.restore(
            vec!["https://s.test/x".to_string(), "https://s.test/y".to_string()],
            HashSet::from(["https://s.test/z".to_string()]),
        );
        let books = vec![sample_book()];

        store.save(&frontier, &books).unwrap();
        let checkpoint = CheckpointStore::load(dir.path(), "run-1").unwrap();

        assert_eq!(
            checkpoint.pending,
            vec!["https://s.test/x", "https://s.test/y"]
        );
        assert_eq!(
            checkpoint.visited,
            HashSet::from(["https://s.test/z".to_string()])
        );
        assert_eq!(checkpoint.books, books);
    }

    #[test]
    fn test_restored_frontier_matches_saved_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path(), "run-1");

        let mut original = Frontier::new();
        original.seed("https://s.test/", &[]);
        let drawn = original.draw_batch(1);
        assert_eq!(drawn.len(), 1);
        original.offer("https://s.test/next");

        store.save(&original, &[]).unwrap();
        let checkpoint = CheckpointStore::load(dir.path(), "run-1").unwrap();

        let mut restored = Frontier::new();
        restored.restore(checkpoint.pending, checkpoint.visited);

        assert_eq!(restored.pending_len(), original.pending_len());
        assert_eq!(restored.visited_len(), original.visited_len());
        assert!(!restored.offer("https://s.test/"));
    }

    #[test]
    fn test_missing_artifact_refuses_resume() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path(), "run-1");
        store.save(&Frontier::new(), &[]).unwrap();

        fs::remove_file(dir.path().join("books-run-1.json")).unwrap();

        let err = CheckpointStore::load(dir.path(), "run-1").unwrap_err();
        assert!(matches!(err, CrawlError::CheckpointIncomplete { .. }));
    }

    #[test]
    fn test_unknown_run_id_refuses_resume() {
        let dir = tempfile::tempdir().unwrap();
        let err = CheckpointStore::load(dir.path(), "nope").unwrap_err();
        assert!(matches!(err, CrawlError::CheckpointIncomplete { .. }));
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path(), "run-1");

        let mut frontier = Frontier::new();
        frontier.offer("https://s.test/a");
        store.save(&frontier, &[]).unwrap();

        frontier.draw_batch(1);
        store.save(&frontier, &[sample_book()]).unwrap();

        let checkpoint = CheckpointStore::load(dir.path(), "run-1").unwrap();
        assert!(checkpoint.pending.is_empty());
        assert_eq!(checkpoint.books.len(), 1);
        assert_eq!(
            checkpoint.visited,
            HashSet::from(["https://s.test/a".to_string()])
        );
    }
}
