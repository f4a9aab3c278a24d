//! Prompt composition from retrieved context.
//!
//! The prompt layout is deliberately rigid: the same query and results
//! always produce byte-identical output, which keeps generation
//! reproducible and prompts diffable in tests. Each context block names
//! its source page and relevance so both the model and a human reader can
//! trace an answer back to the document.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::RetrievalResult;

const CONTEXT_HEADER: &str = "RELEVANT CONTEXT:";
const BLOCK_SEPARATOR: &str = "\n---\n";
const INSTRUCTION: &str = "INSTRUCTIONS: Answer the question using only the context above.";

/// A fully composed generation prompt.
///
/// The first line is always `QUESTION: {query}`, which template-mode
/// generation relies on to recover the query without re-plumbing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt(String);

impl Prompt {
    /// The prompt text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the prompt, returning the text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composes the generation prompt for `query` over `results`.
///
/// Results are rendered in rank order, one block per chunk:
///
/// ```text
/// QUESTION: {query}
///
/// RELEVANT CONTEXT:
/// [Page {page}]
/// Relevance: {similarity as percent, 2 decimals}%
/// {chunk text}
///
/// ---
/// [Page ...]
///
/// INSTRUCTIONS: Answer the question using only the context above.
/// ```
pub fn compose(query: &str, results: &[RetrievalResult]) -> Prompt {
    let blocks: Vec<String> = results
        .iter()
        .map(|result| {
            format!(
                "[Page {}]\nRelevance: {:.2}%\n{}\n",
                result.chunk.page,
                result.similarity * 100.0,
                result.chunk.text
            )
        })
        .collect();
    let context = blocks.join(BLOCK_SEPARATOR);
    Prompt(format!(
        "QUESTION: {query}\n\n{CONTEXT_HEADER}\n{context}\n\n{INSTRUCTION}"
    ))
}
