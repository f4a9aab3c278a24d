//! # Grounded Answer Example
//!
//! Runs the whole pipeline offline: chunk a two-page document, embed it
//! with a deterministic mock provider, and answer a question in template
//! mode. No API keys, no running services.
//!
//! Run: `cargo run --example grounded_answer`

use std::sync::Arc;

use ragline_core::embedding::normalize;
use ragline_core::{EmbeddingProvider, PageDocument, PipelineConfig, RagEngine};

// ---------------------------------------------------------------------------
// MockEmbedder - deterministic hash-based embeddings for demos/tests
// ---------------------------------------------------------------------------

struct MockEmbedder {
    dimension: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_one(&self, text: &str) -> ragline_core::Result<Vec<f32>> {
        // Deterministic embedding: hash the text bytes, then expand the
        // hash into a normalized vector whose direction depends on the
        // content.
        let hash = text
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|i| (hash.wrapping_add(i as u64) as f32).sin())
            .collect();
        normalize(&mut vector);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -- 1. Configure the pipeline ----------------------------------------
    // A small word budget so this short document still yields several
    // chunks; 64-dimensional mock vectors keep the demo light.
    let config = PipelineConfig::builder()
        .chunk_size(24)
        .chunk_overlap(6)
        .embedding_dimension(64)
        .top_k(3)
        .build()?;

    // -- 2. Assemble the engine --------------------------------------------
    // No generator is set, so answers come from template mode: formatted
    // retrieved context instead of a synthesized reply.
    let engine = RagEngine::builder()
        .config(config)
        .embedder(Arc::new(MockEmbedder { dimension: 64 }))
        .build()?;

    // -- 3. Index a paged document -----------------------------------------
    let pages = vec![
        PageDocument::new(
            1,
            "The starter plan includes one project and community support. \
             Upgrades take effect immediately. Downgrades apply at the next \
             billing cycle. All plans are billed monthly.",
        ),
        PageDocument::new(
            2,
            "The team plan includes unlimited projects and priority support. \
             Annual billing saves two months. Invoices are sent to the \
             account owner at the start of each period.",
        ),
    ];

    let stats = engine.index_documents(&pages).await?;
    println!(
        "Indexed {} pages into {} chunks ({} dimensions)\n",
        stats.pages, stats.chunks, stats.dimension
    );

    // -- 4. Retrieve and answer --------------------------------------------
    let query = "when do downgrades apply?";
    let results = engine.retrieve(query, 3).await?;
    println!("Query: \"{query}\"");
    for result in &results {
        let preview: String = result.chunk.text.chars().take(60).collect();
        println!(
            "  #{} page {} similarity {:.3}: {preview}",
            result.rank, result.chunk.page, result.similarity
        );
    }

    let answer = engine.answer(query).await?;
    println!("\n{}", answer.text);
    Ok(())
}
