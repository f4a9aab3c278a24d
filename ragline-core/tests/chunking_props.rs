//! Property tests for sentence chunking.

use proptest::prelude::*;
use ragline_core::chunking::{Chunker, SentenceChunker};

/// Generate a sentence of 1..12 lowercase words ending in a terminator.
fn arb_sentence() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-z]{1,8}", 1..12),
        prop_oneof![Just('.'), Just('!'), Just('?')],
    )
        .prop_map(|(words, terminator)| format!("{}{terminator}", words.join(" ")))
}

/// Generate a document of 1..30 sentences separated by single spaces.
fn arb_document() -> impl Strategy<Value = String> {
    proptest::collection::vec(arb_sentence(), 1..30).prop_map(|sentences| sentences.join(" "))
}

fn chunk_words(chunk: &str) -> Vec<&str> {
    chunk.split(' ').collect()
}

/// **Property: overlap continuity**
/// *For any* document and any overlap smaller than the chunk budget, the
/// trailing overlap words of each chunk reappear verbatim as the leading
/// words of the next chunk (the whole chunk when it is shorter than the
/// overlap).
mod prop_overlap_continuity {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn adjacent_chunks_share_the_overlap_window(
            text in arb_document(),
            chunk_size in 4usize..40,
            overlap in 0usize..10,
        ) {
            prop_assume!(overlap < chunk_size);
            let chunker = SentenceChunker::new(chunk_size, overlap);
            let chunks = chunker.split(&text);

            for pair in chunks.windows(2) {
                let previous = chunk_words(&pair[0]);
                let next = chunk_words(&pair[1]);
                let carried = overlap.min(previous.len());
                prop_assert!(next.len() >= carried);
                prop_assert_eq!(
                    &previous[previous.len() - carried..],
                    &next[..carried],
                    "chunk did not start with its predecessor's tail",
                );
            }
        }
    }
}

/// **Property: chunking is deterministic**
/// *For any* document and parameters, chunking twice produces identical
/// chunk lists.
mod prop_chunking_deterministic {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn repeated_runs_are_identical(
            text in arb_document(),
            chunk_size in 1usize..40,
            overlap in 0usize..10,
        ) {
            prop_assume!(overlap < chunk_size);
            let chunker = SentenceChunker::new(chunk_size, overlap);
            prop_assert_eq!(chunker.split(&text), chunker.split(&text));
        }
    }
}

/// **Property: every word survives chunking**
/// *For any* document, stripping the carried overlap prefix from each
/// chunk and concatenating the rest reproduces the document's words in
/// order. Nothing is dropped and nothing is duplicated beyond the overlap.
mod prop_words_covered {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn concatenation_reproduces_the_document(
            text in arb_document(),
            chunk_size in 4usize..40,
            overlap in 0usize..10,
        ) {
            prop_assume!(overlap < chunk_size);
            let chunker = SentenceChunker::new(chunk_size, overlap);
            let chunks = chunker.split(&text);

            let mut rebuilt: Vec<&str> = Vec::new();
            for (position, chunk) in chunks.iter().enumerate() {
                let words = chunk_words(chunk);
                let carried = if position == 0 {
                    0
                } else {
                    overlap.min(chunk_words(&chunks[position - 1]).len())
                };
                rebuilt.extend_from_slice(&words[carried..]);
            }

            let original: Vec<&str> = text.split_whitespace().collect();
            prop_assert_eq!(rebuilt, original);
        }
    }
}
