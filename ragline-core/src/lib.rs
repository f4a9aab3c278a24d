//! Retrieval-augmented generation over paged documents.
//!
//! `ragline-core` turns a paged document into grounded answers in five
//! stages: chunking ([`chunking`]), embedding ([`embedding`]), exact
//! vector search ([`index`] and [`retrieval`]), prompt composition
//! ([`augment`]), and generation ([`generation`]). [`RagEngine`] wires
//! the stages together behind one facade.
//!
//! The crate is backend-agnostic: bring an [`EmbeddingProvider`] and,
//! optionally, a [`CompletionModel`]. Without a completion backend the
//! engine still answers every query by formatting the retrieved context
//! directly.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use ragline_core::{EmbeddingProvider, PageDocument, PipelineConfig, RagEngine, Result};
//!
//! struct MyEmbedder;
//!
//! #[async_trait]
//! impl EmbeddingProvider for MyEmbedder {
//!     async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
//!         # let _ = text;
//!         todo!("call your embedding backend")
//!     }
//!
//!     fn dimension(&self) -> usize {
//!         384
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let engine = RagEngine::builder()
//!     .config(PipelineConfig::default())
//!     .embedder(Arc::new(MyEmbedder))
//!     .build()?;
//!
//! engine
//!     .index_documents(&[PageDocument::new(1, "First page text.")])
//!     .await?;
//! let answer = engine.answer("what does the first page say?").await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod augment;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod index;
pub mod retrieval;

pub use augment::Prompt;
pub use chunking::{Chunker, RecursiveChunker, SentenceChunker, chunk_documents};
pub use config::{ChunkStrategy, PipelineConfig, PipelineConfigBuilder, SamplingOptions};
pub use document::{Chunk, PageDocument, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use engine::{IndexStats, RagEngine, RagEngineBuilder};
pub use error::{RaglineError, Result};
pub use generation::{Answer, CompletionModel, GenerationMode, Generator};
pub use index::VectorIndex;
pub use retrieval::Retriever;
