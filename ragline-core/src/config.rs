//! Pipeline configuration.
//!
//! [`PipelineConfig`] gathers the tunables shared across chunking,
//! indexing, retrieval, and generation. Values are validated once at
//! build time so the stages themselves can assume a coherent setup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chunking::{Chunker, RecursiveChunker, SentenceChunker};
use crate::error::{RaglineError, Result};

/// Default chunk budget in words.
pub const DEFAULT_CHUNK_SIZE: usize = 200;
/// Default overlap carried between adjacent chunks, in words.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
/// Default embedding vector width.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Which chunking strategy the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Word-budgeted chunks that never split a sentence. The default.
    #[default]
    Sentence,
    /// Character-budgeted chunks split along a separator hierarchy.
    Recursive,
}

impl ChunkStrategy {
    /// Instantiates the chunker this strategy names.
    pub fn chunker(self, chunk_size: usize, chunk_overlap: usize) -> Arc<dyn Chunker> {
        match self {
            ChunkStrategy::Sentence => Arc::new(SentenceChunker::new(chunk_size, chunk_overlap)),
            ChunkStrategy::Recursive => Arc::new(RecursiveChunker::new(chunk_size, chunk_overlap)),
        }
    }
}

/// Sampling parameters forwarded verbatim to the completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
    /// Top-k token sampling cutoff.
    pub top_k: u32,
    /// Nucleus sampling probability mass.
    pub top_p: f32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
            top_k: 40,
            top_p: 0.9,
        }
    }
}

/// Validated configuration for a [`RagEngine`](crate::engine::RagEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Chunk budget. Words for [`ChunkStrategy::Sentence`], characters for
    /// [`ChunkStrategy::Recursive`].
    pub chunk_size: usize,
    /// Overlap carried from each chunk into the next, in the same unit as
    /// `chunk_size`. Must be strictly smaller than `chunk_size`.
    pub chunk_overlap: usize,
    /// Chunking strategy.
    pub chunk_strategy: ChunkStrategy,
    /// Width every embedding vector must have.
    pub embedding_dimension: usize,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Sampling parameters for the completion backend.
    pub sampling: SamplingOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            chunk_strategy: ChunkStrategy::default(),
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
            top_k: DEFAULT_TOP_K,
            sampling: SamplingOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a builder seeded with the defaults.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Sets the chunk budget.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Sets the overlap carried between adjacent chunks.
    pub fn chunk_overlap(mut self, chunk_overlap: usize) -> Self {
        self.config.chunk_overlap = chunk_overlap;
        self
    }

    /// Sets the chunking strategy.
    pub fn chunk_strategy(mut self, strategy: ChunkStrategy) -> Self {
        self.config.chunk_strategy = strategy;
        self
    }

    /// Sets the required embedding vector width.
    pub fn embedding_dimension(mut self, dimension: usize) -> Self {
        self.config.embedding_dimension = dimension;
        self
    }

    /// Sets the number of chunks retrieved per query.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Sets the sampling parameters for generation.
    pub fn sampling(mut self, sampling: SamplingOptions) -> Self {
        self.config.sampling = sampling;
        self
    }

    /// Validates the configuration and returns it.
    pub fn build(self) -> Result<PipelineConfig> {
        let config = self.config;
        if config.chunk_size == 0 {
            return Err(RaglineError::Config("chunk_size must be at least 1".into()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RaglineError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.embedding_dimension == 0 {
            return Err(RaglineError::Config(
                "embedding_dimension must be at least 1".into(),
            ));
        }
        if config.top_k == 0 {
            return Err(RaglineError::Config("top_k must be at least 1".into()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = PipelineConfig::builder().build().expect("defaults are valid");
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.embedding_dimension, 384);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.chunk_strategy, ChunkStrategy::Sentence);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = PipelineConfig::builder().chunk_size(0).build().unwrap_err();
        assert!(matches!(err, RaglineError::Config(_)));
    }

    #[test]
    fn rejects_overlap_equal_to_chunk_size() {
        let err = PipelineConfig::builder()
            .chunk_size(50)
            .chunk_overlap(50)
            .build()
            .unwrap_err();
        assert!(matches!(err, RaglineError::Config(_)));
    }

    #[test]
    fn rejects_zero_top_k() {
        let err = PipelineConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, RaglineError::Config(_)));
    }

    #[test]
    fn rejects_zero_dimension() {
        let err = PipelineConfig::builder()
            .embedding_dimension(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, RaglineError::Config(_)));
    }

    #[test]
    fn sampling_defaults_match_backend_expectations() {
        let sampling = SamplingOptions::default();
        assert_eq!(sampling.temperature, 0.7);
        assert_eq!(sampling.max_tokens, 500);
        assert_eq!(sampling.top_k, 40);
        assert_eq!(sampling.top_p, 0.9);
    }

    #[test]
    fn chunk_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&ChunkStrategy::Recursive).expect("serialize");
        assert_eq!(json, r#""recursive""#);
    }
}
