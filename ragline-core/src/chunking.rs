//! Document chunking strategies.
//!
//! [`chunk_documents`] drives a [`Chunker`] over every page of a source
//! document and numbers the resulting chunks globally, in page order.
//! Pages are chunked independently, so no chunk (and no overlap window)
//! ever spans a page boundary.
//!
//! Two strategies are provided. [`SentenceChunker`] is the default: it
//! budgets chunks in words and never splits a sentence, trading exact
//! sizes for readable spans. [`RecursiveChunker`] budgets in characters
//! and splits along a separator hierarchy, accepting mid-sentence cuts
//! in exchange for tighter size control.

use tracing::debug;

use crate::document::{Chunk, PageDocument};
use crate::error::{RaglineError, Result};

/// Splits one page of text into ordered chunk texts.
pub trait Chunker: Send + Sync {
    /// Splits `text` into chunks, left to right. Returned strings are
    /// non-empty; an empty or all-whitespace input yields no chunks.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Chunks every page of `documents` and numbers the chunks globally.
///
/// Chunk `index` values are assigned in emission order across all pages,
/// so they are unique and strictly increasing. Returns
/// [`RaglineError::InvalidState`] if `documents` is empty, which happens
/// when chunking is attempted before any document was loaded.
pub fn chunk_documents(chunker: &dyn Chunker, documents: &[PageDocument]) -> Result<Vec<Chunk>> {
    if documents.is_empty() {
        return Err(RaglineError::InvalidState(
            "no documents loaded; ingest pages before chunking".into(),
        ));
    }

    let mut chunks = Vec::new();
    for document in documents {
        for text in chunker.split(&document.text) {
            if text.is_empty() {
                continue;
            }
            chunks.push(Chunk::new(document.page, chunks.len(), text));
        }
    }
    debug!(
        pages = documents.len(),
        chunks = chunks.len(),
        "chunked documents"
    );
    Ok(chunks)
}

/// Sentence-respecting chunker with a word budget and word overlap.
///
/// Sentences accumulate greedily until adding the next one would exceed
/// `chunk_size` words; the running chunk then closes and the next chunk is
/// seeded with the closed chunk's last `chunk_overlap` words. A chunk only
/// closes once it holds at least one word beyond that carried seed, so a
/// single sentence longer than the budget is emitted whole rather than
/// split mid-sentence.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl SentenceChunker {
    /// Creates a sentence chunker with the given word budget and overlap.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

impl Chunker for SentenceChunker {
    fn split(&self, text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut words: Vec<&str> = Vec::new();
        // Words at the front of `words` carried over from the previous
        // chunk. Fresh content starts after them.
        let mut carried = 0;

        for sentence in sentences(text) {
            if words.len() > carried && words.len() + sentence.len() > self.chunk_size {
                let tail_start = words.len().saturating_sub(self.chunk_overlap);
                chunks.push(words.join(" "));
                words = words.split_off(tail_start);
                carried = words.len();
            }
            words.extend_from_slice(&sentence);
        }

        if words.len() > carried {
            chunks.push(words.join(" "));
        }
        chunks
    }
}

/// Splits text into sentences, collapsing all whitespace runs.
///
/// A sentence ends at a word whose last character is `.`, `!`, or `?`,
/// or at the end of the text. Each sentence is returned as its words.
fn sentences(text: &str) -> Vec<Vec<&str>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for word in text.split_whitespace() {
        current.push(word);
        if word.ends_with(['.', '!', '?']) {
            out.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Separator hierarchy for [`RecursiveChunker`], coarsest first.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// Character-budgeted chunker that splits along a separator hierarchy.
///
/// Text over budget is split on paragraph breaks first, then sentence
/// breaks, then spaces; adjacent fragments merge back together while they
/// fit. A fragment with no usable separator is cut at the character
/// budget. Overlap prepends the word-aligned tail of each chunk to its
/// successor.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Creates a recursive chunker with the given character budget and
    /// overlap.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }
}

impl Chunker for RecursiveChunker {
    fn split(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }

        let mut pieces = Vec::new();
        split_recursive(trimmed, self.chunk_size.max(1), &SEPARATORS, &mut pieces);
        let pieces: Vec<String> = pieces
            .into_iter()
            .map(|piece| piece.trim().to_string())
            .filter(|piece| !piece.is_empty())
            .collect();

        if self.chunk_overlap == 0 || pieces.len() < 2 {
            return pieces;
        }
        apply_overlap(&pieces, self.chunk_overlap)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Splits `text` to fit `budget` characters using `separators`, coarsest
/// first. Segments keep their separator attached and re-merge greedily
/// while they fit.
fn split_recursive(text: &str, budget: usize, separators: &[&str], out: &mut Vec<String>) {
    if char_len(text) <= budget {
        out.push(text.to_string());
        return;
    }
    let Some((separator, rest)) = separators.split_first() else {
        split_at_budget(text, budget, out);
        return;
    };

    let segments = split_keeping(text, separator);
    if segments.len() <= 1 {
        split_recursive(text, budget, rest, out);
        return;
    }

    let mut current = String::new();
    for segment in segments {
        if !current.is_empty() && char_len(&current) + char_len(segment) > budget {
            flush_piece(std::mem::take(&mut current), budget, rest, out);
        }
        current.push_str(segment);
    }
    if !current.is_empty() {
        flush_piece(current, budget, rest, out);
    }
}

/// Emits a merged run, recursing with finer separators if a single
/// segment alone exceeded the budget.
fn flush_piece(piece: String, budget: usize, rest: &[&str], out: &mut Vec<String>) {
    if char_len(&piece) > budget {
        split_recursive(&piece, budget, rest, out);
    } else {
        out.push(piece);
    }
}

/// Splits on `separator`, keeping it attached to the preceding segment.
fn split_keeping<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut segments = Vec::new();
    let mut start = 0;
    while let Some(position) = text[start..].find(separator) {
        let end = start + position + separator.len();
        segments.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

/// Last resort for separator-free text: fixed windows of `budget` chars.
fn split_at_budget(text: &str, budget: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    for window in chars.chunks(budget.max(1)) {
        out.push(window.iter().collect());
    }
}

/// Prepends each chunk (after the first) with the word-aligned tail of
/// its predecessor, at most `overlap` characters long.
fn apply_overlap(pieces: &[String], overlap: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(pieces.len());
    for (position, piece) in pieces.iter().enumerate() {
        if position == 0 {
            out.push(piece.clone());
            continue;
        }
        let tail = word_tail(&pieces[position - 1], overlap);
        if tail.is_empty() {
            out.push(piece.clone());
        } else {
            out.push(format!("{tail} {piece}"));
        }
    }
    out
}

/// Returns a suffix of `text` at most `max_chars` characters long whose
/// start is aligned to a word boundary. A single word longer than the
/// window is returned as the raw character tail.
fn word_tail(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    if char_len(text) <= max_chars {
        return text;
    }
    let skip = char_len(text) - max_chars;
    let window_start = text
        .char_indices()
        .nth(skip)
        .map(|(byte, _)| byte)
        .unwrap_or(0);
    let window = &text[window_start..];
    match window.find(' ') {
        Some(space) if space + 1 < window.len() => &window[space + 1..],
        Some(_) => "",
        None => window,
    }
}
