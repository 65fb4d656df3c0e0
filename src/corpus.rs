//! Search-term corpus
//!
//! The corpus is a plain-text file with one term per line. It is read once at
//! startup and shared read-only by every worker for the rest of the run.

use std::io::ErrorKind;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::{LoadError, Result};

/// Ordered, immutable list of search terms. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    terms: Arc<[String]>,
}

impl Corpus {
    /// Build a corpus from already-clean terms. Blank entries are dropped the
    /// same way the file loader drops them.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: Vec<String> = terms
            .into_iter()
            .filter_map(|t| clean_line(t.as_ref()))
            .collect();
        Self {
            terms: terms.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }
}

impl Deref for Corpus {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.terms
    }
}

pub struct CorpusLoader;

impl CorpusLoader {
    /// Read `path` into a corpus.
    ///
    /// A missing file is not an error and yields an empty corpus. Any other
    /// I/O failure (permissions, invalid UTF-8) is returned as
    /// [`LoadError::CorpusIo`].
    pub async fn load(path: impl AsRef<Path>) -> Result<Corpus> {
        let path = path.as_ref();
        let io_err = |source| LoadError::CorpusIo {
            path: path.to_path_buf(),
            source,
        };

        let file = match File::open(path).await {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "corpus file not found");
                return Ok(Corpus::default());
            }
            Err(e) => return Err(io_err(e)),
        };

        let mut lines = BufReader::new(file).lines();
        let mut terms = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(io_err)? {
            if let Some(term) = clean_line(&line) {
                terms.push(term);
            }
        }

        debug!(path = %path.display(), terms = terms.len(), "corpus loaded");
        Ok(Corpus {
            terms: terms.into(),
        })
    }
}

fn clean_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
