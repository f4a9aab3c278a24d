//! Exact in-memory vector index.
//!
//! [`VectorIndex`] stores chunk vectors in insertion order and answers
//! queries by brute-force scan: every entry is scored with squared
//! Euclidean distance, sorted ascending, and the best `top_k` returned.
//! Exactness is the point; at the corpus sizes this pipeline targets, a
//! linear scan is fast and has no recall loss to tune around.
//!
//! An index is immutable once built. Re-indexing means building a new
//! instance and swapping it in, which is how
//! [`RagEngine`](crate::engine::RagEngine) keeps searches consistent
//! while a rebuild is in flight.

use tracing::debug;

use crate::document::{Chunk, RetrievalResult};
use crate::error::{RaglineError, Result};

/// An immutable exact-search index over chunk vectors.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

impl VectorIndex {
    /// Builds an index from parallel chunk and vector lists.
    ///
    /// Returns [`RaglineError::DimensionMismatch`] if the lists differ in
    /// length or any vector's width differs from `dimension`.
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>, dimension: usize) -> Result<Self> {
        if vectors.len() != chunks.len() {
            return Err(RaglineError::DimensionMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
                unit: "vectors",
            });
        }
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(RaglineError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                    unit: "dimensions",
                });
            }
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();
        debug!(entries = entries.len(), dimension, "built vector index");
        Ok(Self { dimension, entries })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector width this index requires.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the `top_k` nearest chunks to `query`, best first.
    ///
    /// `top_k` is clamped to the index size. Results carry 1-based ranks,
    /// the squared Euclidean distance, and the similarity
    /// `1 / (1 + distance)`. Entries at equal distance keep their
    /// insertion order, so a repeated query always returns the same list.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<RetrievalResult>> {
        if query.len() != self.dimension {
            return Err(RaglineError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
                unit: "dimensions",
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (squared_l2(&entry.vector, query), position))
            .collect();
        scored.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(top_k.min(self.entries.len()));

        let results = scored
            .into_iter()
            .enumerate()
            .map(|(position, (distance, entry_index))| RetrievalResult {
                rank: position + 1,
                chunk: self.entries[entry_index].chunk.clone(),
                similarity: 1.0 / (1.0 + distance),
                distance,
            })
            .collect();
        Ok(results)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
