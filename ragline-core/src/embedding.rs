//! Embedding provider abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// Maps text to fixed-width vectors.
///
/// Implementations must be deterministic per input and must return
/// vectors whose length equals [`dimension`](EmbeddingProvider::dimension)
/// for every call. Backends that embed remotely should L2-normalize their
/// output (see [`normalize`]) so squared Euclidean distance ranks the
/// same way cosine similarity would.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts, preserving order.
    ///
    /// The default embeds one text at a time; backends with a batch API
    /// should override this.
    async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed_one(text).await?);
        }
        Ok(vectors)
    }

    /// Width of every vector this provider returns.
    fn dimension(&self) -> usize;
}

/// Scales `vector` to unit L2 norm in place. A zero vector is left as is.
pub fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_produces_unit_length() {
        let mut vector = vec![3.0, 4.0];
        normalize(&mut vector);
        assert!((vector[0] - 0.6).abs() < 1e-6);
        assert!((vector[1] - 0.8).abs() < 1e-6);
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalize_leaves_zero_vector_untouched() {
        let mut vector = vec![0.0, 0.0, 0.0];
        normalize(&mut vector);
        assert_eq!(vector, vec![0.0, 0.0, 0.0]);
    }
}
