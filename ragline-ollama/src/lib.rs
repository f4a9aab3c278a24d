//! Ollama backends for `ragline-core`.
//!
//! [`OllamaEmbedder`] embeds text through the `/api/embed` endpoint and
//! [`OllamaCompletion`] generates answers through `/api/chat`, with a
//! `/api/tags` health check. Both expect an Ollama server, by default at
//! [`DEFAULT_BASE_URL`].
//!
//! Requests carry no client-side timeout; a slow local model is left to
//! finish rather than being cut off mid-generation.

pub mod completion;
pub mod embedder;

pub use completion::OllamaCompletion;
pub use embedder::OllamaEmbedder;

/// Default address of a local Ollama server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
