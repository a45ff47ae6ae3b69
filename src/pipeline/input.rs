//! Input resolution: validate the source path and pick a parser by extension.
//!
//! ## Why extension only?
//!
//! A `.pptx` file is a ZIP container and so is a `.docx` or `.xlsx`; sniffing
//! magic bytes would not tell them apart and would still need the extension
//! as a tie-breaker. Deciding on the extension alone keeps the rule obvious
//! and lets us reject unsupported inputs before reading a single byte.

use crate::error::Deck2NotesError;
use crate::types::DeckFormat;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A source path that exists and has a supported extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDeck {
    pub path: PathBuf,
    pub format: DeckFormat,
}

/// Map a path's extension (case-insensitive) to a [`DeckFormat`].
pub fn detect_format(path: &Path) -> Result<DeckFormat, Deck2NotesError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(DeckFormat::Pdf),
        "pptx" => Ok(DeckFormat::Pptx),
        _ => Err(Deck2NotesError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        }),
    }
}

/// Resolve a user-supplied path.
///
/// Existence is checked first, so a missing `.txt` file reports
/// `FileNotFound` rather than `UnsupportedFormat`.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<ResolvedDeck, Deck2NotesError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Deck2NotesError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let format = detect_format(path)?;
    debug!("Resolved {} deck: {}", format, path.display());
    Ok(ResolvedDeck {
        path: path.to_path_buf(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_format_is_case_insensitive() {
        assert_eq!(detect_format(Path::new("a.pdf")).unwrap(), DeckFormat::Pdf);
        assert_eq!(detect_format(Path::new("a.PDF")).unwrap(), DeckFormat::Pdf);
        assert_eq!(detect_format(Path::new("deck.PpTx")).unwrap(), DeckFormat::Pptx);
    }

    #[test]
    fn detect_format_rejects_others() {
        for name in ["a.ppt", "a.key", "a.txt", "noext", "archive.pptx.zip"] {
            let err = detect_format(Path::new(name)).unwrap_err();
            assert!(
                matches!(err, Deck2NotesError::UnsupportedFormat { .. }),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn missing_file_is_not_found_even_with_bad_extension() {
        let err = resolve_input("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, Deck2NotesError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_deck() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path()).unwrap_err();
        assert!(matches!(err, Deck2NotesError::FileNotFound { .. }));
    }
}
