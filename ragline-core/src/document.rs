//! Core data types flowing through the retrieval pipeline.
//!
//! A source document is a sequence of [`PageDocument`]s. Chunking turns
//! pages into [`Chunk`]s, and searching the index yields ranked
//! [`RetrievalResult`]s that carry their source chunk along with both the
//! raw distance and the derived similarity score.

use serde::{Deserialize, Serialize};

/// One page of a source document.
///
/// `page` is 1-based and `text` holds the page's full text. Serialized
/// records may name the text field `content` or `chunk`; both are accepted
/// on input and written back as `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    /// 1-based page number within the source document.
    pub page: u32,
    /// Full text of the page.
    #[serde(alias = "content", alias = "chunk")]
    pub text: String,
}

impl PageDocument {
    /// Creates a page document.
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// A contiguous span of text produced by chunking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Page the chunk was taken from.
    pub page: u32,
    /// 0-based position in the overall chunk sequence.
    pub index: usize,
    /// Chunk text. Never empty.
    pub text: String,
}

impl Chunk {
    /// Creates a chunk.
    pub fn new(page: u32, index: usize, text: impl Into<String>) -> Self {
        Self {
            page,
            index,
            text: text.into(),
        }
    }

    /// Number of whitespace-separated words in the chunk text.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// One ranked hit from a vector search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// 1-based rank in the result list (1 = best).
    pub rank: usize,
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity derived from distance as `1 / (1 + distance)`, in (0, 1].
    pub similarity: f32,
    /// Squared Euclidean distance between query and chunk vectors.
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_document_accepts_content_alias() {
        let doc: PageDocument = serde_json::from_str(r#"{"page": 3, "content": "hello"}"#)
            .expect("content alias should deserialize");
        assert_eq!(doc.page, 3);
        assert_eq!(doc.text, "hello");
    }

    #[test]
    fn page_document_accepts_chunk_alias() {
        let doc: PageDocument = serde_json::from_str(r#"{"page": 1, "chunk": "body"}"#)
            .expect("chunk alias should deserialize");
        assert_eq!(doc.text, "body");
    }

    #[test]
    fn page_document_serializes_canonical_field() {
        let doc = PageDocument::new(2, "text here");
        let json = serde_json::to_string(&doc).expect("serialize");
        assert!(json.contains(r#""text":"text here""#));
        assert!(!json.contains("content"));
    }

    #[test]
    fn chunk_word_count_splits_on_whitespace() {
        let chunk = Chunk::new(1, 0, "one  two\nthree");
        assert_eq!(chunk.word_count(), 3);
    }
}
