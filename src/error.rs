//! Error types for the edgequake-deck2notes library.
//!
//! A single fatal error type, [`Deck2NotesError`], covers every stage of the
//! pipeline. There is no partial-success mode: the pipeline is a straight
//! line from deck to notes, so any failure stops the run and is returned to
//! the caller unchanged.
//!
//! Variants are grouped by the stage that raises them, which makes it easy
//! for the CLI to print a hint that matches where the run stopped.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-deck2notes library.
#[derive(Debug, Error)]
pub enum Deck2NotesError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source file was not found at the given path.
    #[error("Source deck not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file extension is neither `.pdf` nor `.pptx`.
    #[error(
        "Unsupported file format '{extension}' for '{path}'\n\
Supported formats: .pdf, .pptx"
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The PDF or PPTX parser rejected the file.
    #[error("Failed to extract slides from '{path}': {detail}")]
    Extraction { path: PathBuf, detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The LLM call failed or its reply did not match the expected schema.
    #[error("Generation failed during {stage}: {detail}")]
    Generation { stage: String, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Publishing to the remote document host failed.
    #[error("Export to remote host failed: {detail}")]
    Export { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A required credential is missing or a setting is invalid.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Deck2NotesError {
    pub(crate) fn generation(stage: impl Into<String>, detail: impl ToString) -> Self {
        Deck2NotesError::Generation {
            stage: stage.into(),
            detail: detail.to_string(),
        }
    }
}
