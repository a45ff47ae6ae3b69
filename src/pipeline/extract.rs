//! Slide extraction: turn a PDF or PPTX file into [`SlideRecord`]s.
//!
//! Both parsers are synchronous and CPU-bound, so the async entry points
//! move the work onto tokio's blocking pool with `spawn_blocking`. That keeps
//! the runtime responsive for the LLM calls that follow.

use crate::error::Deck2NotesError;
use crate::pipeline::input::{resolve_input, ResolvedDeck};
use crate::pipeline::pptx;
use crate::types::{DeckFormat, DeckMetadata, SlideRecord};
use lopdf::Document;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extract one record per page (PDF) or slide (PPTX), in deck order.
///
/// # Errors
/// * [`Deck2NotesError::FileNotFound`]: `path` does not exist
/// * [`Deck2NotesError::UnsupportedFormat`]: extension is not `.pdf`/`.pptx`
/// * [`Deck2NotesError::Extraction`]: the parser rejected the file
pub async fn extract(path: impl AsRef<Path>) -> Result<Vec<SlideRecord>, Deck2NotesError> {
    let deck = resolve_input(path)?;
    info!("Extracting {} deck: {}", deck.format, deck.path.display());
    let slides = tokio::task::spawn_blocking(move || extract_resolved(&deck))
        .await
        .map_err(|e| Deck2NotesError::Internal(format!("extraction task panicked: {e}")))??;
    info!("Extracted {} slides", slides.len());
    Ok(slides)
}

/// Read the page/slide count without extracting text.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DeckMetadata, Deck2NotesError> {
    let deck = resolve_input(path)?;
    tokio::task::spawn_blocking(move || -> Result<DeckMetadata, Deck2NotesError> {
        let slide_count = match deck.format {
            DeckFormat::Pdf => load_pdf(&deck.path)?.get_pages().len(),
            DeckFormat::Pptx => pptx::count_slides(open(&deck.path)?)
                .map_err(|detail| extraction_error(&deck.path, detail))?,
        };
        Ok(DeckMetadata {
            path: deck.path,
            file_type: deck.format,
            slide_count,
        })
    })
    .await
    .map_err(|e| Deck2NotesError::Internal(format!("inspect task panicked: {e}")))?
}

/// Blocking extraction for an already-resolved deck.
pub fn extract_resolved(deck: &ResolvedDeck) -> Result<Vec<SlideRecord>, Deck2NotesError> {
    match deck.format {
        DeckFormat::Pdf => extract_pdf(&deck.path),
        DeckFormat::Pptx => pptx::parse_deck(open(&deck.path)?)
            .map_err(|detail| extraction_error(&deck.path, detail)),
    }
}

fn extract_pdf(path: &Path) -> Result<Vec<SlideRecord>, Deck2NotesError> {
    let doc = load_pdf(path)?;
    let pages = doc.get_pages();
    let page_count = pages.len();
    debug!("PDF has {} pages", page_count);

    let metadata = BTreeMap::from([
        ("file_type".to_string(), DeckFormat::Pdf.as_str().to_string()),
        (DeckFormat::Pdf.count_key().to_string(), page_count.to_string()),
    ]);

    let slides = pages
        .keys()
        .enumerate()
        .map(|(idx, page_num)| SlideRecord {
            slide_number: idx + 1,
            text: page_text(&doc, *page_num),
            images: Vec::new(),
            metadata: metadata.clone(),
        })
        .collect();
    Ok(slides)
}

/// Text of one page. A page whose fonts lopdf cannot decode (e.g. `Identity-H`
/// without a `ToUnicode` map) yields empty text instead of failing the deck.
fn page_text(doc: &Document, page_num: u32) -> String {
    doc.extract_text(&[page_num]).unwrap_or_else(|e| {
        warn!("Page {}: no text extracted ({})", page_num, e);
        String::new()
    })
}

fn load_pdf(path: &Path) -> Result<Document, Deck2NotesError> {
    Document::load(path).map_err(|e| extraction_error(path, e))
}

fn open(path: &Path) -> Result<BufReader<File>, Deck2NotesError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| extraction_error(path, e))
}

fn extraction_error(path: &Path, detail: impl ToString) -> Deck2NotesError {
    Deck2NotesError::Extraction {
        path: PathBuf::from(path),
        detail: detail.to_string(),
    }
}
