//! Command-line front end for the ragline pipeline.
//!
//! Three subcommands: `chunk` inspects what chunking would feed the
//! index, `ask` answers one question, and `chat` keeps an indexed
//! document open for an interactive session. Logs go to stderr so piped
//! answer output stays clean; set `RUST_LOG` to adjust verbosity.

mod ingest;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ragline_core::config::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_EMBEDDING_DIMENSION, DEFAULT_TOP_K,
};
use ragline_core::{ChunkStrategy, Generator, PipelineConfig, RagEngine, chunk_documents};
use ragline_ollama::{DEFAULT_BASE_URL, OllamaCompletion, OllamaEmbedder};

use crate::ingest::PagesFormat;

#[derive(Parser)]
#[command(
    name = "ragline",
    version,
    about = "Grounded question answering over paged documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a document into chunks and report or save them
    Chunk(ChunkArgs),
    /// Index a document and answer one question
    Ask(AskArgs),
    /// Index a document and answer questions interactively
    Chat(ChatArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Input document
    file: PathBuf,

    /// Input format
    #[arg(long, value_enum, default_value_t = PagesFormat::Text)]
    format: PagesFormat,
}

#[derive(Args)]
struct ChunkingArgs {
    /// Chunk budget (words for sentence, characters for recursive)
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Overlap carried between adjacent chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Chunking strategy
    #[arg(long, value_enum, default_value_t = StrategyArg::Sentence)]
    strategy: StrategyArg,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    /// Word budget, never splits a sentence
    Sentence,
    /// Character budget, splits along a separator hierarchy
    Recursive,
}

impl From<StrategyArg> for ChunkStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Sentence => ChunkStrategy::Sentence,
            StrategyArg::Recursive => ChunkStrategy::Recursive,
        }
    }
}

#[derive(Args)]
struct BackendArgs {
    /// Ollama server address
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    ollama_url: String,

    /// Embedding model
    #[arg(long, default_value = "all-minilm")]
    embed_model: String,

    /// Vector width the embedding model produces
    #[arg(long, default_value_t = DEFAULT_EMBEDDING_DIMENSION)]
    embedding_dimension: usize,

    /// Completion model
    #[arg(long, default_value = "llama3.2:3b")]
    model: String,

    /// Answer from retrieved context without calling the completion model
    #[arg(long)]
    no_llm: bool,

    /// Chunks retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

#[derive(Args)]
struct ChunkArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    chunking: ChunkingArgs,

    /// Write the chunks as JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of chunk previews to print
    #[arg(long, default_value_t = 3)]
    sample: usize,
}

#[derive(Args)]
struct AskArgs {
    #[command(flatten)]
    input: InputArgs,

    /// The question to answer
    question: String,

    #[command(flatten)]
    chunking: ChunkingArgs,

    #[command(flatten)]
    backend: BackendArgs,
}

#[derive(Args)]
struct ChatArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    chunking: ChunkingArgs,

    #[command(flatten)]
    backend: BackendArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    match Cli::parse().command {
        Command::Chunk(args) => run_chunk(args),
        Command::Ask(args) => run_ask(args).await,
        Command::Chat(args) => run_chat(args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_chunk(args: ChunkArgs) -> anyhow::Result<()> {
    let pages = ingest::load_pages(&args.input.file, args.input.format)?;
    let config = chunking_config(&args.chunking)?;
    let chunker = config
        .chunk_strategy
        .chunker(config.chunk_size, config.chunk_overlap);
    let chunks = chunk_documents(&*chunker, &pages)?;

    let total_words: usize = chunks.iter().map(|chunk| chunk.word_count()).sum();
    let average = if chunks.is_empty() {
        0
    } else {
        total_words / chunks.len()
    };
    println!("Source: {}", args.input.file.display());
    println!("Pages: {}", pages.len());
    println!("Chunks: {} (about {average} words each)", chunks.len());
    for chunk in chunks.iter().take(args.sample) {
        let preview: String = chunk.text.chars().take(80).collect();
        println!("  [{}] page {}: {preview}", chunk.index, chunk.page);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&chunks)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote {} chunks to {}", chunks.len(), path.display());
    }
    Ok(())
}

async fn run_ask(args: AskArgs) -> anyhow::Result<()> {
    let pages = ingest::load_pages(&args.input.file, args.input.format)?;
    let engine = build_engine(&args.chunking, &args.backend).await?;

    let stats = engine.index_documents(&pages).await?;
    info!(
        pages = stats.pages,
        chunks = stats.chunks,
        mode = %engine.generation_mode(),
        "document indexed"
    );

    let answer = engine.answer(&args.question).await?;
    println!("{}", answer.text);
    Ok(())
}

async fn run_chat(args: ChatArgs) -> anyhow::Result<()> {
    let pages = ingest::load_pages(&args.input.file, args.input.format)?;
    let engine = build_engine(&args.chunking, &args.backend).await?;

    let stats = engine.index_documents(&pages).await?;
    println!(
        "Indexed {} chunks from {} pages ({} mode). Ask a question, or exit to quit.",
        stats.chunks,
        stats.pages,
        engine.generation_mode()
    );

    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("ragline> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                let _ = editor.add_history_entry(line);
                match engine.answer(line).await {
                    Ok(answer) => println!("\n{}\n", answer.text),
                    Err(error) => eprintln!("error: {error}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        }
    }
    Ok(())
}

fn chunking_config(chunking: &ChunkingArgs) -> anyhow::Result<PipelineConfig> {
    let config = PipelineConfig::builder()
        .chunk_size(chunking.chunk_size)
        .chunk_overlap(chunking.chunk_overlap)
        .chunk_strategy(chunking.strategy.into())
        .build()?;
    Ok(config)
}

async fn build_engine(chunking: &ChunkingArgs, backend: &BackendArgs) -> anyhow::Result<RagEngine> {
    let config = PipelineConfig::builder()
        .chunk_size(chunking.chunk_size)
        .chunk_overlap(chunking.chunk_overlap)
        .chunk_strategy(chunking.strategy.into())
        .embedding_dimension(backend.embedding_dimension)
        .top_k(backend.top_k)
        .build()?;

    let embedder = Arc::new(
        OllamaEmbedder::new(&backend.ollama_url)
            .with_model(&backend.embed_model)
            .with_dimension(backend.embedding_dimension),
    );
    let generator = if backend.no_llm {
        Generator::template()
    } else {
        let model =
            Arc::new(OllamaCompletion::new(&backend.ollama_url).with_model(&backend.model));
        Generator::with_model(model, config.sampling).await
    };

    let engine = RagEngine::builder()
        .config(config)
        .embedder(embedder)
        .generator(generator)
        .build()?;
    Ok(engine)
}
