//! Query-time retrieval: embed the query, search the index.

use std::sync::Arc;

use tracing::debug;

use crate::document::RetrievalResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RaglineError, Result};
use crate::index::VectorIndex;

/// Couples an embedding provider with a built [`VectorIndex`].
///
/// Cheap to construct; the engine builds one per query over the index
/// snapshot current at that moment.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
}

impl Retriever {
    /// Creates a retriever over an embedder and an index snapshot.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Embeds `query` and returns its `top_k` nearest chunks.
    ///
    /// Rejects blank queries and a zero `top_k` with
    /// [`RaglineError::InvalidArgument`]; embedding failures propagate
    /// from the provider.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalResult>> {
        if query.trim().is_empty() {
            return Err(RaglineError::InvalidArgument(
                "query must not be blank".into(),
            ));
        }
        if top_k == 0 {
            return Err(RaglineError::InvalidArgument(
                "top_k must be at least 1".into(),
            ));
        }

        let query_vector = self.embedder.embed_one(query).await?;
        let results = self.index.search(&query_vector, top_k)?;
        debug!(
            requested = top_k,
            returned = results.len(),
            "retrieved chunks for query"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::document::Chunk;

    /// Returns the same fixed vector for every input.
    struct FixedEmbedder {
        vector: Vec<f32>,
    }

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.vector.clone())
        }

        fn dimension(&self) -> usize {
            self.vector.len()
        }
    }

    fn retriever() -> Retriever {
        let chunks = vec![
            Chunk::new(1, 0, "near the query"),
            Chunk::new(1, 1, "far from the query"),
        ];
        let vectors = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let index = VectorIndex::build(chunks, vectors, 2).expect("valid index");
        Retriever::new(
            Arc::new(FixedEmbedder {
                vector: vec![1.0, 0.0],
            }),
            Arc::new(index),
        )
    }

    #[tokio::test]
    async fn rejects_blank_query() {
        let err = retriever().retrieve("   ", 2).await.unwrap_err();
        assert!(matches!(err, RaglineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn rejects_zero_top_k() {
        let err = retriever().retrieve("question", 0).await.unwrap_err();
        assert!(matches!(err, RaglineError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn returns_nearest_chunk_first() {
        let results = retriever().retrieve("question", 2).await.expect("retrieval");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.text, "near the query");
        assert_eq!(results[0].rank, 1);
    }
}
