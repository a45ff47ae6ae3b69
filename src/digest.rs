//! End-to-end entry points: deck in, study notes out.
//!
//! ## Why two entry points?
//!
//! [`digest`] stops at the structured [`Summary`] so library users can
//! render it themselves; [`digest_and_export`] runs the configured exporter
//! on top. Both run the stages strictly in order with at most one LLM call
//! in flight: every stage consumes the whole output of the previous one.

use crate::config::SummaryConfig;
use crate::error::Deck2NotesError;
use crate::export::Exporter;
use crate::pipeline::{concepts, extract, normalize, summary};
use crate::progress::Stage;
use crate::types::{ExportReceipt, Summary};
use edgequake_llm::{LLMProvider, OpenAIProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub use crate::pipeline::extract::inspect;

/// Extract, normalise and summarise a deck.
///
/// # Errors
/// Fails fast: the first stage error is returned unchanged and nothing
/// after it runs.
pub async fn digest(
    path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<Summary, Deck2NotesError> {
    let provider = resolve_provider(config)?;
    run_stages(path.as_ref(), &provider, config).await
}

/// Run the full pipeline including the configured exporter.
///
/// Returns where the notes ended up: the Markdown file path or the URL of
/// the published page.
pub async fn digest_and_export(
    path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<ExportReceipt, Deck2NotesError> {
    let start = Instant::now();
    let provider = resolve_provider(config)?;
    let summary = run_stages(path.as_ref(), &provider, config).await?;
    let receipt = run_export(&summary, &provider, config).await?;
    info!(
        "Notes ready at {} ({}ms)",
        receipt.target,
        start.elapsed().as_millis()
    );
    Ok(receipt)
}

/// Export an already generated summary with the configured exporter.
///
/// Lets callers inspect or persist the [`Summary`] from [`digest`] before
/// it is published.
pub async fn export_summary(
    summary: &Summary,
    config: &SummaryConfig,
) -> Result<ExportReceipt, Deck2NotesError> {
    let provider = resolve_provider(config)?;
    run_export(summary, &provider, config).await
}

/// Synchronous wrapper around [`digest_and_export`].
///
/// Creates a temporary tokio runtime internally.
pub fn digest_sync(
    path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<ExportReceipt, Deck2NotesError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Deck2NotesError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(digest_and_export(path, config))
}

async fn run_stages(
    path: &Path,
    provider: &Arc<dyn LLMProvider>,
    config: &SummaryConfig,
) -> Result<Summary, Deck2NotesError> {
    // ── Extract ──────────────────────────────────────────────────────────
    stage_start(config, Stage::Extract);
    let slides = extract::extract(path).await?;
    stage_complete(config, Stage::Extract, slides.len());

    // ── Normalize ────────────────────────────────────────────────────────
    stage_start(config, Stage::Normalize);
    let normalized = normalize::normalize_all(&slides);
    stage_complete(config, Stage::Normalize, normalized.len());

    // ── Concepts ─────────────────────────────────────────────────────────
    stage_start(config, Stage::Concepts);
    let concepts = concepts::extract_concepts(provider, &normalized, config).await?;
    stage_complete(config, Stage::Concepts, concepts.len());

    // ── Summary ──────────────────────────────────────────────────────────
    stage_start(config, Stage::Summary);
    let summary = summary::summarize(provider, &concepts, config).await?;
    stage_complete(config, Stage::Summary, summary.topics.len());

    Ok(summary)
}

async fn run_export(
    summary: &Summary,
    provider: &Arc<dyn LLMProvider>,
    config: &SummaryConfig,
) -> Result<ExportReceipt, Deck2NotesError> {
    stage_start(config, Stage::Export);
    let exporter = Exporter::from_target(&config.export);
    let receipt = exporter.export(summary, provider, config).await?;
    stage_complete(config, Stage::Export, 1);
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_complete(&receipt.target);
    }
    Ok(receipt)
}

/// Use the injected provider, else build an OpenAI one from the API key.
fn resolve_provider(config: &SummaryConfig) -> Result<Arc<dyn LLMProvider>, Deck2NotesError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }
    match config.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => Ok(Arc::new(
            OpenAIProvider::new(key).with_model(&config.model),
        )),
        _ => Err(Deck2NotesError::Configuration(
            "OpenAI API key is missing.\nSet OPENAI_API_KEY or pass --api-key.".into(),
        )),
    }
}

fn stage_start(config: &SummaryConfig, stage: Stage) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(config: &SummaryConfig, stage: Stage, items: usize) {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_complete(stage, items);
    }
}
