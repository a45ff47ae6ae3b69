//! Exporters: the last pipeline stage.
//!
//! Two interchangeable strategies share one `export` operation:
//!
//! * [`markdown`]: ask the LLM to format the summary and write one file;
//! * [`publish`]: drive the tool-calling [`agent`] against a Notion
//!   [`notion::DocumentHost`].
//!
//! [`Exporter`] picks one from [`crate::config::ExportTarget`].

pub mod agent;
pub mod markdown;
pub mod notion;
pub mod publish;

use crate::config::{ExportTarget, SummaryConfig};
use crate::error::Deck2NotesError;
use crate::types::{ExportReceipt, Summary};
use edgequake_llm::LLMProvider;
use markdown::MarkdownExporter;
use publish::NotionExporter;
use std::sync::Arc;

/// The configured export strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Exporter {
    Markdown(MarkdownExporter),
    Notion(NotionExporter),
}

impl Exporter {
    pub fn from_target(target: &ExportTarget) -> Self {
        match target {
            ExportTarget::Markdown { path } => Exporter::Markdown(MarkdownExporter::new(path)),
            ExportTarget::Notion(settings) => Exporter::Notion(NotionExporter::new(settings.clone())),
        }
    }

    pub async fn export(
        &self,
        summary: &Summary,
        provider: &Arc<dyn LLMProvider>,
        config: &SummaryConfig,
    ) -> Result<ExportReceipt, Deck2NotesError> {
        match self {
            Exporter::Markdown(m) => m.export(summary, provider, config).await,
            Exporter::Notion(n) => n.export(summary, provider, config).await,
        }
    }
}
