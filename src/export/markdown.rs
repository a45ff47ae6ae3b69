//! Local-file exporter: LLM-formatted Markdown written to disk.

use crate::config::SummaryConfig;
use crate::error::Deck2NotesError;
use crate::pipeline::llm::generate_text;
use crate::prompts::markdown_prompt;
use crate::types::{ExportReceipt, Summary};
use edgequake_llm::LLMProvider;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub const STAGE: &str = "markdown formatting";

/// Formats the summary as Markdown and writes it to `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownExporter {
    pub path: PathBuf,
}

impl MarkdownExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Ask the LLM for a Markdown rendering and write the reply verbatim.
    ///
    /// An existing file at `path` is replaced.
    pub async fn export(
        &self,
        summary: &Summary,
        provider: &Arc<dyn LLMProvider>,
        config: &SummaryConfig,
    ) -> Result<ExportReceipt, Deck2NotesError> {
        let summary_json = serde_json::to_string_pretty(summary)
            .map_err(|e| Deck2NotesError::Internal(format!("serialise summary: {e}")))?;
        let markdown = generate_text(provider, STAGE, markdown_prompt(&summary_json), config).await?;

        write_atomic(&self.path, markdown).await?;
        info!("Wrote {}", self.path.display());
        Ok(ExportReceipt {
            target: self.path.display().to_string(),
        })
    }
}

/// Write `contents` to a temp file next to `path`, then rename it into place.
///
/// Readers never observe a half-written file, and a failed write leaves any
/// previous file untouched.
pub async fn write_atomic(path: &Path, contents: String) -> Result<(), Deck2NotesError> {
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<(), Deck2NotesError> {
        let write_failed = |source: std::io::Error| Deck2NotesError::OutputWriteFailed {
            path: target.clone(),
            source,
        };
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_failed)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_failed)?;
        tmp.write_all(contents.as_bytes()).map_err(write_failed)?;
        tmp.persist(&target).map_err(|e| write_failed(e.error))?;
        Ok(())
    })
    .await
    .map_err(|e| Deck2NotesError::Internal(format!("write task panicked: {e}")))?
}
