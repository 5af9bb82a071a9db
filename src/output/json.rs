use crate::book::Book;
use crate::{BookSink, CrawlError, Result};
use std::fs;
use std::path::PathBuf;

/// Book sink writing one pretty-printed JSON file per source.
///
/// `<dir>/<source>.json` is replaced wholesale on every flush, mirroring the
/// downstream store's replace-all-on-success semantics.
pub struct JsonBookSink {
    dir: PathBuf,
}

impl JsonBookSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl BookSink for JsonBookSink {
    fn replace(&mut self, source: &str, books: &[Book]) -> Result<()> {
        if source.is_empty() || source.contains(['/', '\\']) {
            return Err(CrawlError::Sink(format!(
                "source '{}' is not a usable file name",
                source
            )));
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.json", source));
        let json = serde_json::to_vec_pretty(books)?;
        fs::write(&path, json)?;

        tracing::info!("Wrote {} books to {}", books.len(), path.display());
        Ok(())
    }
}
