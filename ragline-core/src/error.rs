//! Error types for the `ragline-core` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval pipeline.
#[derive(Debug, Error)]
pub enum RaglineError {
    /// A required input document was missing before chunking began.
    #[error("document source not found: {path}")]
    NotFound {
        /// The path that was expected to exist.
        path: String,
    },

    /// An operation was invoked before its prerequisite stage.
    #[error("invalid pipeline state: {0}")]
    InvalidState(String),

    /// Vector/chunk counts or vector dimensions disagreed at index build
    /// or search time.
    #[error("dimension mismatch: expected {expected} {unit}, got {actual}")]
    DimensionMismatch {
        /// The value the index requires.
        expected: usize,
        /// The value that was supplied.
        actual: usize,
        /// What was being counted (`"vectors"` or `"dimensions"`).
        unit: &'static str,
    },

    /// A caller-supplied argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The embedding capability failed.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The completion backend was unreachable or returned an unusable
    /// response. Recovered locally by template-mode generation.
    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RaglineError>;
