//! Remote-publish exporter: a Notion page written by the tool-calling agent.

use crate::config::{NotionSettings, SummaryConfig};
use crate::error::Deck2NotesError;
use crate::export::agent::{run_agent, AgentRun};
use crate::export::notion::{DocumentHost, NotionHost};
use crate::pipeline::llm::build_options;
use crate::prompts::notion_agent_prompt;
use crate::types::{ExportReceipt, Summary};
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::{error, info};

/// Publishes the summary as a Notion page.
#[derive(Debug, Clone, PartialEq)]
pub struct NotionExporter {
    pub settings: NotionSettings,
}

impl NotionExporter {
    pub fn new(settings: NotionSettings) -> Self {
        Self { settings }
    }

    /// Open a host session and let the agent build the page.
    ///
    /// Every failure inside the session is logged and returned as
    /// [`Deck2NotesError::Export`]. Uses `config.host` when set, otherwise
    /// connects a [`NotionHost`] with the exporter's settings.
    pub async fn export(
        &self,
        summary: &Summary,
        provider: &Arc<dyn LLMProvider>,
        config: &SummaryConfig,
    ) -> Result<ExportReceipt, Deck2NotesError> {
        let host: Arc<dyn DocumentHost> = match config.host {
            Some(ref host) => Arc::clone(host),
            None => Arc::new(NotionHost::connect(&self.settings).await.map_err(export_failed)?),
        };

        let summary_json = serde_json::to_string_pretty(summary)
            .map_err(|e| Deck2NotesError::Internal(format!("serialise summary: {e}")))?;
        let parent = self.settings.parent_page_id.clone();

        let outcome = run_agent(AgentRun {
            provider,
            host: host.as_ref(),
            instruction: notion_agent_prompt(&summary_json, parent.as_deref()),
            default_parent: parent,
            max_steps: self.settings.max_agent_steps,
            options: build_options(config),
            progress: config.progress_callback.as_ref(),
        })
        .await
        .map_err(export_failed)?;

        let page = outcome
            .page
            .ok_or_else(|| export_failed("agent finished without creating a page"))?;
        info!(
            "Published {} ({} blocks, {} steps)",
            page.url, outcome.blocks_appended, outcome.steps
        );
        Ok(ExportReceipt { target: page.url })
    }
}

fn export_failed(e: impl std::fmt::Display) -> Deck2NotesError {
    error!("Notion export failed: {}", e);
    Deck2NotesError::Export {
        detail: e.to_string(),
    }
}
