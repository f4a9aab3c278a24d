//! The end-to-end retrieval engine.
//!
//! [`RagEngine`] owns the chunker, the embedding provider, the generator,
//! and the current index. Indexing replaces the index atomically: queries
//! running against the previous snapshot finish against it, and queries
//! arriving after the swap see the new one. Queries before the first
//! [`index_documents`](RagEngine::index_documents) call fail with
//! [`RaglineError::InvalidState`].

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::augment;
use crate::chunking::{self, Chunker};
use crate::config::PipelineConfig;
use crate::document::{PageDocument, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RaglineError, Result};
use crate::generation::{Answer, GenerationMode, Generator};
use crate::index::VectorIndex;
use crate::retrieval::Retriever;

/// Counts reported by a successful indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Pages that were chunked.
    pub pages: usize,
    /// Chunks embedded and indexed.
    pub chunks: usize,
    /// Vector width of the built index.
    pub dimension: usize,
}

/// Chunks, embeds, indexes, retrieves, and answers.
pub struct RagEngine {
    config: PipelineConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Generator,
    index: RwLock<Option<Arc<VectorIndex>>>,
}

impl std::fmt::Debug for RagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RagEngine {
    /// Creates a builder.
    pub fn builder() -> RagEngineBuilder {
        RagEngineBuilder::default()
    }

    /// The engine's configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The mode the generator will answer in.
    pub fn generation_mode(&self) -> GenerationMode {
        self.generator.mode()
    }

    /// Chunks and embeds `documents`, then swaps in a freshly built index.
    ///
    /// The swap is atomic with respect to concurrent queries. Calling this
    /// again replaces the previous index wholesale; nothing is merged.
    pub async fn index_documents(&self, documents: &[PageDocument]) -> Result<IndexStats> {
        let chunks = chunking::chunk_documents(&*self.chunker, documents)?;
        if chunks.is_empty() {
            return Err(RaglineError::InvalidState(
                "documents produced no chunks; nothing to index".into(),
            ));
        }

        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let vectors = self.embedder.embed_many(&texts).await?;
        let index = VectorIndex::build(chunks, vectors, self.config.embedding_dimension)?;
        let stats = IndexStats {
            pages: documents.len(),
            chunks: index.len(),
            dimension: index.dimension(),
        };
        info!(
            pages = stats.pages,
            chunks = stats.chunks,
            dimension = stats.dimension,
            "indexed documents"
        );

        *self.index.write().await = Some(Arc::new(index));
        Ok(stats)
    }

    /// Returns the `top_k` chunks nearest to `query`.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        let index = self.current_index().await?;
        Retriever::new(Arc::clone(&self.embedder), index)
            .retrieve(query, top_k)
            .await
    }

    /// Answers `query` from the indexed documents.
    ///
    /// Retrieves the configured `top_k` chunks, composes the prompt, and
    /// generates. The returned [`Answer`] is tagged with the mode that
    /// actually produced it.
    pub async fn answer(&self, query: &str) -> Result<Answer> {
        let results = self.retrieve(query, self.config.top_k).await?;
        let prompt = augment::compose(query, &results);
        let answer = self.generator.generate(&prompt, &results).await?;
        info!(mode = %answer.mode, results = results.len(), "answered query");
        Ok(answer)
    }

    /// Snapshot of the current index, or `InvalidState` before the first
    /// indexing run. The clone keeps the read lock out of await points.
    async fn current_index(&self) -> Result<Arc<VectorIndex>> {
        self.index.read().await.clone().ok_or_else(|| {
            RaglineError::InvalidState(
                "no index built; call index_documents before querying".into(),
            )
        })
    }
}

/// Builder for [`RagEngine`].
#[derive(Default)]
pub struct RagEngineBuilder {
    config: Option<PipelineConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Generator>,
}

impl RagEngineBuilder {
    /// Sets the pipeline configuration. Required.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the chunker. Defaults to the one named by
    /// [`PipelineConfig::chunk_strategy`].
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Sets the embedding provider. Required.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Sets the generator. Defaults to template mode.
    pub fn generator(mut self, generator: Generator) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Validates the parts and assembles the engine.
    ///
    /// Fails with [`RaglineError::Config`] if a required part is missing
    /// or the embedder's dimension disagrees with the configuration.
    pub fn build(self) -> Result<RagEngine> {
        let config = self
            .config
            .ok_or_else(|| RaglineError::Config("config is required".into()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RaglineError::Config("embedding provider is required".into()))?;
        if embedder.dimension() != config.embedding_dimension {
            return Err(RaglineError::Config(format!(
                "embedder dimension ({}) does not match configured embedding_dimension ({})",
                embedder.dimension(),
                config.embedding_dimension
            )));
        }

        let chunker = self
            .chunker
            .unwrap_or_else(|| config.chunk_strategy.chunker(config.chunk_size, config.chunk_overlap));
        let generator = self.generator.unwrap_or_else(Generator::template);

        Ok(RagEngine {
            config,
            chunker,
            embedder,
            generator,
            index: RwLock::new(None),
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::embedding::normalize;

    /// Deterministic stand-in embedder: seeds a small vector from a text
    /// hash, then normalizes it.
    struct HashEmbedder {
        dimension: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for HashEmbedder {
        async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
            let seed = text
                .bytes()
                .fold(0u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(byte as u64));
            let mut vector: Vec<f32> = (0..self.dimension)
                .map(|i| ((seed.wrapping_add(i as u64) % 97) as f32 / 97.0).sin())
                .collect();
            normalize(&mut vector);
            Ok(vector)
        }

        fn dimension(&self) -> usize {
            self.dimension
        }
    }

    fn engine() -> RagEngine {
        let config = PipelineConfig::builder()
            .chunk_size(12)
            .chunk_overlap(3)
            .embedding_dimension(16)
            .top_k(2)
            .build()
            .expect("valid config");
        RagEngine::builder()
            .config(config)
            .embedder(Arc::new(HashEmbedder { dimension: 16 }))
            .build()
            .expect("valid engine")
    }

    fn pages() -> Vec<PageDocument> {
        vec![
            PageDocument::new(1, "The first page talks about apples. Apples are red or green."),
            PageDocument::new(2, "The second page covers oranges. Oranges are always orange."),
        ]
    }

    #[tokio::test]
    async fn querying_before_indexing_is_invalid_state() {
        let engine = engine();
        let err = engine.answer("anything").await.unwrap_err();
        assert!(matches!(err, RaglineError::InvalidState(_)));
        let err = engine.retrieve("anything", 1).await.unwrap_err();
        assert!(matches!(err, RaglineError::InvalidState(_)));
    }

    #[tokio::test]
    async fn indexing_reports_stats_and_enables_queries() {
        let engine = engine();
        let stats = engine.index_documents(&pages()).await.expect("indexing");
        assert_eq!(stats.pages, 2);
        assert!(stats.chunks >= 2);
        assert_eq!(stats.dimension, 16);

        let results = engine.retrieve("apples", 2).await.expect("retrieval");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].rank, 1);
    }

    #[tokio::test]
    async fn reindexing_replaces_the_previous_index() {
        let engine = engine();
        engine.index_documents(&pages()).await.expect("first indexing");
        let replacement = vec![PageDocument::new(1, "Only bananas here now.")];
        let stats = engine
            .index_documents(&replacement)
            .await
            .expect("second indexing");
        assert_eq!(stats.pages, 1);

        let results = engine.retrieve("fruit", 5).await.expect("retrieval");
        assert!(results.iter().all(|r| r.chunk.text.contains("bananas")));
    }

    #[tokio::test]
    async fn answers_default_to_template_mode() {
        let engine = engine();
        engine.index_documents(&pages()).await.expect("indexing");
        let answer = engine.answer("what color are apples?").await.expect("answer");
        assert_eq!(answer.mode, GenerationMode::Template);
        assert!(answer.text.contains("QUESTION: what color are apples?"));
    }

    #[tokio::test]
    async fn indexing_nothing_but_blank_pages_is_invalid_state() {
        let engine = engine();
        let blank = vec![PageDocument::new(1, "   ")];
        let err = engine.index_documents(&blank).await.unwrap_err();
        assert!(matches!(err, RaglineError::InvalidState(_)));
    }

    #[test]
    fn builder_requires_an_embedder() {
        let config = PipelineConfig::default();
        let err = RagEngine::builder().config(config).build().unwrap_err();
        assert!(matches!(err, RaglineError::Config(_)));
    }

    #[test]
    fn builder_rejects_dimension_disagreement() {
        let config = PipelineConfig::builder()
            .embedding_dimension(384)
            .build()
            .expect("valid config");
        let err = RagEngine::builder()
            .config(config)
            .embedder(Arc::new(HashEmbedder { dimension: 16 }))
            .build()
            .unwrap_err();
        assert!(matches!(err, RaglineError::Config(_)));
    }
}
