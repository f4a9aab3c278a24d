//! Ollama embedding provider using the `/api/embed` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use ragline_core::embedding::{EmbeddingProvider, normalize};
use ragline_core::error::{RaglineError, Result};

use crate::DEFAULT_BASE_URL;

const PROVIDER: &str = "Ollama";

/// The default embedding model.
const DEFAULT_MODEL: &str = "all-minilm";

/// The dimensionality of `all-minilm` vectors.
const DEFAULT_DIMENSION: usize = 384;

/// Texts per request. Longer documents are embedded in slices this big
/// so one giant request cannot stall the server.
const BATCH_SIZE: usize = 32;

/// An [`EmbeddingProvider`] backed by a local Ollama server.
///
/// Server responses are L2-normalized before they leave this type, so
/// squared Euclidean distance over the output ranks like cosine
/// similarity.
///
/// # Example
///
/// ```rust,ignore
/// use ragline_ollama::OllamaEmbedder;
///
/// let embedder = OllamaEmbedder::local().with_model("nomic-embed-text").with_dimension(768);
/// let vector = embedder.embed_one("hello world").await?;
/// ```
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    /// Creates an embedder against `base_url` with the default model.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.into(),
            dimension: DEFAULT_DIMENSION,
        }
    }

    /// Creates an embedder against the default local server.
    pub fn local() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Sets the model name.
    ///
    /// Remember to also set [`with_dimension`](Self::with_dimension) when
    /// the model's output width differs from the default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the vector width the model produces.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

fn embedding_error(message: impl Into<String>) -> RaglineError {
    RaglineError::Embedding {
        provider: PROVIDER.into(),
        message: message.into(),
    }
}

/// Parses an `/api/embed` response body, checks row count and width, and
/// normalizes each row in place.
fn decode_embeddings(body: &str, expected_rows: usize, dimension: usize) -> Result<Vec<Vec<f32>>> {
    let response: EmbedResponse = serde_json::from_str(body)
        .map_err(|e| embedding_error(format!("failed to parse response: {e}")))?;
    if response.embeddings.len() != expected_rows {
        return Err(embedding_error(format!(
            "server returned {} embeddings for {} inputs",
            response.embeddings.len(),
            expected_rows
        )));
    }

    let mut rows = response.embeddings;
    for row in &mut rows {
        if row.len() != dimension {
            return Err(RaglineError::DimensionMismatch {
                expected: dimension,
                actual: row.len(),
                unit: "dimensions",
            });
        }
        normalize(row);
    }
    Ok(rows)
}

// ── EmbeddingProvider implementation ───────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let rows = self.embed_many(&[text]).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| embedding_error("server returned an empty response"))
    }

    async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            debug!(
                provider = PROVIDER,
                batch_size = batch.len(),
                model = %self.model,
                "embedding batch"
            );
            let request_body = EmbedRequest {
                model: &self.model,
                input: batch,
            };

            let response = self
                .client
                .post(&url)
                .json(&request_body)
                .send()
                .await
                .map_err(|e| {
                    error!(provider = PROVIDER, error = %e, "request failed");
                    embedding_error(format!("request failed: {e}"))
                })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| embedding_error(format!("failed to read response: {e}")))?;
            if !status.is_success() {
                error!(provider = PROVIDER, %status, "server error");
                return Err(embedding_error(format!(
                    "server returned {status}: {}",
                    snippet(&body)
                )));
            }

            vectors.extend(decode_embeddings(&body, batch.len(), self.dimension)?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// First 200 characters of an error body, for log-friendly messages.
fn snippet(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(200).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
