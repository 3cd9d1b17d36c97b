//! Staged corpus: one file per size class per session

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docbench_core::{CorpusBuilder, GenerationError, TestDocument};
use tracing::info;

use crate::generator::DocumentGenerator;

/// Size classes (KB) staged when none are configured
pub const DEFAULT_SIZE_CLASSES: [u32; 5] = [1, 5, 10, 25, 50];

/// Create the staging directory before any session starts.
pub async fn prepare_staging_area(dir: &Path) -> Result<(), GenerationError> {
    tokio::fs::create_dir_all(dir).await?;
    Ok(())
}

/// [`CorpusBuilder`] that writes generated documents to a staging directory
///
/// Staged files are left in place after the run.
#[derive(Debug, Clone)]
pub struct SyntheticCorpus {
    staging_dir: PathBuf,
    size_classes: Vec<u32>,
    seed: Option<u64>,
}

impl SyntheticCorpus {
    /// Corpus staged under `staging_dir` with the default size classes
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            size_classes: DEFAULT_SIZE_CLASSES.to_vec(),
            seed: None,
        }
    }

    /// Replace the size classes
    pub fn with_size_classes(mut self, sizes: Vec<u32>) -> Self {
        self.size_classes = sizes;
        self
    }

    /// Make generation reproducible; session `s` uses `seed + s`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Staging directory
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Staged path for a document
    pub fn document_path(&self, session_id: usize, index: usize, size_kb: u32) -> PathBuf {
        self.staging_dir
            .join(format!("loadtest_doc_s{session_id}_{index}_{size_kb}kb.txt"))
    }

    fn generator_for(&self, session_id: usize) -> DocumentGenerator {
        match self.seed {
            Some(seed) => DocumentGenerator::seeded(seed.wrapping_add(session_id as u64)),
            None => DocumentGenerator::new(),
        }
    }
}

#[async_trait]
impl CorpusBuilder for SyntheticCorpus {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn size_classes(&self) -> &[u32] {
        &self.size_classes
    }

    async fn build(&self, session_id: usize) -> Result<Vec<TestDocument>, GenerationError> {
        if self.size_classes.is_empty() {
            return Err(GenerationError::InvalidConfig(
                "no size classes configured".to_string(),
            ));
        }

        tokio::fs::create_dir_all(&self.staging_dir).await?;

        let mut generator = self.generator_for(session_id);
        let mut documents = Vec::with_capacity(self.size_classes.len());

        for (index, &size_kb) in self.size_classes.iter().enumerate() {
            let content = generator.generate(size_kb);
            let path = self.document_path(session_id, index, size_kb);
            tokio::fs::write(&path, content.as_bytes()).await?;

            info!(
                session_id,
                size_kb,
                "Created test document: {}",
                path.display()
            );
            documents.push(TestDocument::new(size_kb, content, path));
        }

        Ok(documents)
    }
}
