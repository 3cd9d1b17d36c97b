//! Sentence-based text generation

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Words every generated sentence is drawn from
pub const VOCABULARY: [&str; 20] = [
    "document",
    "processing",
    "system",
    "performance",
    "optimization",
    "chunking",
    "tokenization",
    "metadata",
    "analysis",
    "quality",
    "assessment",
    "parallel",
    "threading",
    "memory",
    "efficiency",
    "throughput",
    "latency",
    "benchmark",
    "profiling",
    "monitoring",
];

const MIN_SENTENCE_WORDS: usize = 5;
const MAX_SENTENCE_WORDS: usize = 25;

/// Generates ASCII text of an exact size
///
/// Sentences of 5 to 25 words, drawn with replacement from [`VOCABULARY`],
/// are appended until the target is reached and the result is cut to size.
pub struct DocumentGenerator {
    rng: StdRng,
}

impl DocumentGenerator {
    /// Generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a payload of exactly `size_kb * 1024` bytes
    pub fn generate(&mut self, size_kb: u32) -> String {
        let target = size_kb as usize * 1024;
        let mut text = String::with_capacity(target + 256);

        while text.len() < target {
            self.push_sentence(&mut text);
        }

        // Vocabulary is ASCII, so any byte offset is a char boundary
        text.truncate(target);
        text
    }

    fn push_sentence(&mut self, text: &mut String) {
        let words = self.rng.gen_range(MIN_SENTENCE_WORDS..=MAX_SENTENCE_WORDS);
        for i in 0..words {
            if i > 0 {
                text.push(' ');
            }
            text.push_str(VOCABULARY[self.rng.gen_range(0..VOCABULARY.len())]);
        }
        text.push_str(". ");
    }
}

impl Default for DocumentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentGenerator").finish_non_exhaustive()
    }
}
