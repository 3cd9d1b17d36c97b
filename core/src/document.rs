//! Synthetic test documents

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One generated payload staged on local storage
///
/// Content is shared so that repeating a document inside a batch never
/// copies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDocument {
    size_kb: u32,
    content: Arc<str>,
    path: PathBuf,
}

impl TestDocument {
    /// Create a document from its size class, content and staged path
    pub fn new(size_kb: u32, content: impl Into<Arc<str>>, path: impl Into<PathBuf>) -> Self {
        Self {
            size_kb,
            content: content.into(),
            path: path.into(),
        }
    }

    /// Size class in kilobytes
    pub fn size_kb(&self) -> u32 {
        self.size_kb
    }

    /// Document text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the content is empty
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Path of the staged file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of the staged path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("document_{}kb.txt", self.size_kb))
    }
}

impl std::fmt::Display for TestDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}kb)", self.path.display(), self.size_kb)
    }
}

/// Build `batches` batches, each the corpus repeated `repeat` times
pub fn build_batches(
    corpus: &[TestDocument],
    batches: usize,
    repeat: usize,
) -> Vec<Vec<TestDocument>> {
    (0..batches)
        .map(|_| {
            let mut batch = Vec::with_capacity(corpus.len() * repeat);
            for _ in 0..repeat {
                batch.extend(corpus.iter().cloned());
            }
            batch
        })
        .collect()
}
