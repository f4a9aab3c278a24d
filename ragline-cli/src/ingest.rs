//! Document loading: pages from plain text or JSON records.

use std::fs;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use tracing::debug;

use ragline_core::{PageDocument, RaglineError};

/// On-disk layout of the input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PagesFormat {
    /// Plain text; form feed (U+000C) separates pages, as `pdftotext`
    /// emits.
    Text,
    /// A JSON array of `{"page": N, "text": "..."}` records. `content`
    /// and `chunk` are accepted as aliases for `text`.
    Json,
}

/// Loads the pages of `path`, dropping pages with no text.
///
/// A missing file maps to [`RaglineError::NotFound`] so callers can tell
/// a wrong path apart from read or parse failures.
pub fn load_pages(path: &Path, format: PagesFormat) -> anyhow::Result<Vec<PageDocument>> {
    if !path.exists() {
        return Err(RaglineError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let pages = match format {
        PagesFormat::Text => pages_from_text(&raw),
        PagesFormat::Json => pages_from_json(&raw)?,
    };
    anyhow::ensure!(!pages.is_empty(), "no non-empty pages in {}", path.display());
    debug!(pages = pages.len(), "loaded document");
    Ok(pages)
}

/// Blank pages are dropped but keep their slot in the numbering, so page
/// numbers still match the source document.
fn pages_from_text(raw: &str) -> Vec<PageDocument> {
    raw.split('\u{000C}')
        .enumerate()
        .filter_map(|(position, text)| {
            let text = text.trim();
            (!text.is_empty()).then(|| PageDocument::new(position as u32 + 1, text))
        })
        .collect()
}

fn pages_from_json(raw: &str) -> anyhow::Result<Vec<PageDocument>> {
    let pages: Vec<PageDocument> = serde_json::from_str(raw).context("parsing page records")?;
    Ok(pages
        .into_iter()
        .filter(|page| !page.text.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feed_separates_pages() {
        let pages = pages_from_text("first page\u{000C}second page");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page, 1);
        assert_eq!(pages[0].text, "first page");
        assert_eq!(pages[1].page, 2);
    }

    #[test]
    fn blank_pages_keep_their_slot_in_the_numbering() {
        let pages = pages_from_text("one\u{000C}   \u{000C}three");
        let numbers: Vec<u32> = pages.iter().map(|p| p.page).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn text_without_form_feeds_is_one_page() {
        let pages = pages_from_text("just a single page of text");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, 1);
    }

    #[test]
    fn json_records_accept_field_aliases() {
        let raw = r#"[
            {"page": 1, "content": "from content"},
            {"page": 2, "chunk": "from chunk"},
            {"page": 3, "text": "from text"}
        ]"#;
        let pages = pages_from_json(raw).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text, "from content");
        assert_eq!(pages[1].text, "from chunk");
        assert_eq!(pages[2].text, "from text");
    }

    #[test]
    fn json_blank_pages_are_dropped() {
        let raw = r#"[{"page": 1, "text": "  "}, {"page": 2, "text": "kept"}]"#;
        let pages = pages_from_json(raw).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page, 2);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = load_pages(Path::new("/no/such/document.txt"), PagesFormat::Text).unwrap_err();
        let rag_err = err.downcast_ref::<RaglineError>().expect("domain error");
        assert!(matches!(rag_err, RaglineError::NotFound { .. }));
    }
}
