//! Answer generation.
//!
//! A [`Generator`] runs in one of two modes. In LLM mode it sends the
//! composed prompt to a [`CompletionModel`] and appends a source citation
//! block to the reply. In template mode it formats the retrieved chunks
//! directly, with no model in the loop. Mode is decided once at
//! construction (a failed health check demotes to template mode), but a
//! completion failure never fails the query: the generator falls back to
//! a template answer for that invocation and tries the model again on the
//! next one.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::augment::Prompt;
use crate::config::SamplingOptions;
use crate::document::RetrievalResult;
use crate::error::Result;

/// Max characters of chunk text quoted in an LLM-mode citation.
const CITATION_PREVIEW_CHARS: usize = 150;
/// Max characters of chunk text shown per passage in a template answer.
const TEMPLATE_PREVIEW_CHARS: usize = 300;
const RULE: &str = "======================================================================";

/// A text completion backend.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Completes `prompt` with the given sampling options.
    async fn complete(&self, prompt: &str, options: &SamplingOptions) -> Result<String>;

    /// Checks that the backend is reachable and able to serve requests.
    async fn health_check(&self) -> Result<()>;
}

/// How an answer was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Synthesized by a completion backend, with citations appended.
    Llm,
    /// Formatted directly from retrieved chunks.
    Template,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Llm => f.write_str("llm"),
            GenerationMode::Template => f.write_str("template"),
        }
    }
}

/// A generated answer, tagged with the mode that actually produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The answer text shown to the user.
    pub text: String,
    /// The mode that produced `text`. Reports `Template` when an LLM-mode
    /// generator fell back for this invocation.
    pub mode: GenerationMode,
}

/// Turns a prompt and its retrieved context into an [`Answer`].
pub struct Generator {
    mode: GenerationMode,
    model: Option<Arc<dyn CompletionModel>>,
    options: SamplingOptions,
}

impl Generator {
    /// Creates a template-mode generator with no completion backend.
    pub fn template() -> Self {
        Self {
            mode: GenerationMode::Template,
            model: None,
            options: SamplingOptions::default(),
        }
    }

    /// Creates an LLM-mode generator over `model`.
    ///
    /// Runs the backend's health check once; if it fails, the generator
    /// starts in template mode instead and never calls the model.
    pub async fn with_model(model: Arc<dyn CompletionModel>, options: SamplingOptions) -> Self {
        match model.health_check().await {
            Ok(()) => {
                info!("completion backend reachable, generating in llm mode");
                Self {
                    mode: GenerationMode::Llm,
                    model: Some(model),
                    options,
                }
            }
            Err(error) => {
                warn!(%error, "completion backend unavailable, starting in template mode");
                Self {
                    mode: GenerationMode::Template,
                    model: None,
                    options,
                }
            }
        }
    }

    /// The mode this generator was constructed in.
    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Generates an answer for `prompt` over `results`.
    ///
    /// Never fails on backend trouble: a completion error produces a
    /// template answer for this call, and the next call tries the model
    /// again.
    pub async fn generate(&self, prompt: &Prompt, results: &[RetrievalResult]) -> Result<Answer> {
        if let (GenerationMode::Llm, Some(model)) = (self.mode, &self.model) {
            match model.complete(prompt.as_str(), &self.options).await {
                Ok(text) => {
                    info!(chars = text.len(), "llm answer generated");
                    return Ok(Answer {
                        text: with_citations(&text, results),
                        mode: GenerationMode::Llm,
                    });
                }
                Err(error) => {
                    warn!(%error, "completion failed, answering from retrieved context");
                }
            }
        }
        Ok(template_answer(prompt, results))
    }
}

/// Appends the source citation block to an LLM reply.
fn with_citations(text: &str, results: &[RetrievalResult]) -> String {
    let mut out = String::from(text.trim_end());
    out.push_str("\n\n");
    out.push_str(RULE);
    out.push_str("\nSOURCES:\n");
    out.push_str(RULE);
    out.push('\n');
    for result in results {
        out.push_str(&format!(
            "\n[{}] Page {} (Similarity: {:.1}%)\n    Preview: {}\n",
            result.rank,
            result.chunk.page,
            result.similarity * 100.0,
            preview(&result.chunk.text, CITATION_PREVIEW_CHARS)
        ));
    }
    out
}

/// Formats retrieved chunks as the answer, model-free and deterministic.
///
/// The question is recovered from the prompt's first line rather than
/// passed separately, so template output and LLM input can never drift
/// out of sync on what was asked.
fn template_answer(prompt: &Prompt, results: &[RetrievalResult]) -> Answer {
    let question = prompt.as_str().lines().next().unwrap_or_default();

    let mut text = String::new();
    text.push_str(RULE);
    text.push_str("\nLLM answer unavailable - showing retrieved context\n");
    text.push_str(RULE);
    text.push_str("\n\n");
    text.push_str(question);
    text.push_str("\n\n");
    text.push_str(&format!("Found {} relevant passages:\n\n", results.len()));
    for result in results {
        text.push_str(&format!(
            "[{}] Page {} (Similarity: {:.1}%)\n{}\n\n",
            result.rank,
            result.chunk.page,
            result.similarity * 100.0,
            preview(&result.chunk.text, TEMPLATE_PREVIEW_CHARS)
        ));
    }
    text.push_str(RULE);
    text.push_str("\nTIP: configure a completion backend for synthesized answers\n");
    text.push_str(RULE);

    Answer {
        text,
        mode: GenerationMode::Template,
    }
}

/// First `max_chars` characters of `text`, with an ellipsis if truncated.
fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
