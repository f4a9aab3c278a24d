//! Ollama completion backend using the `/api/chat` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use ragline_core::config::SamplingOptions;
use ragline_core::error::{RaglineError, Result};
use ragline_core::generation::CompletionModel;

use crate::DEFAULT_BASE_URL;

/// The default completion model.
const DEFAULT_MODEL: &str = "llama3.2:3b";

/// A [`CompletionModel`] backed by a local Ollama server.
///
/// Prompts go out as a single user message with streaming disabled, and
/// the health check asks `/api/tags` whether the server is up before the
/// first completion is ever attempted.
pub struct OllamaCompletion {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaCompletion {
    /// Creates a completion backend against `base_url` with the default
    /// model.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.into(),
        }
    }

    /// Creates a completion backend against the default local server.
    pub fn local() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }

    /// Sets the model name (e.g. `mistral:7b`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
    options: ChatSampling,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Sampling parameters in Ollama's field names.
#[derive(Serialize)]
struct ChatSampling {
    temperature: f32,
    num_predict: u32,
    top_k: u32,
    top_p: f32,
}

impl From<&SamplingOptions> for ChatSampling {
    fn from(options: &SamplingOptions) -> Self {
        Self {
            temperature: options.temperature,
            num_predict: options.max_tokens,
            top_k: options.top_k,
            top_p: options.top_p,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

fn generation_error(message: impl Into<String>) -> RaglineError {
    RaglineError::GenerationUnavailable(message.into())
}

/// Parses an `/api/chat` response body into the reply text.
fn decode_chat(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| generation_error(format!("failed to parse response: {e}")))?;
    if response.message.content.trim().is_empty() {
        return Err(generation_error("server returned an empty completion"));
    }
    Ok(response.message.content)
}

// ── CompletionModel implementation ─────────────────────────────────

#[async_trait]
impl CompletionModel for OllamaCompletion {
    async fn complete(&self, prompt: &str, options: &SamplingOptions) -> Result<String> {
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "requesting completion"
        );
        let request_body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: ChatSampling::from(options),
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                generation_error(format!("request failed: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| generation_error(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            error!(%status, "completion server error");
            return Err(generation_error(format!(
                "server returned {status}: {}",
                snippet(&body)
            )));
        }

        decode_chat(&body)
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| generation_error(format!("server unreachable: {e}")))?;

        if response.status().is_success() {
            debug!(base_url = %self.base_url, "completion server reachable");
            Ok(())
        } else {
            Err(generation_error(format!(
                "server returned {} to the health check",
                response.status()
            )))
        }
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
