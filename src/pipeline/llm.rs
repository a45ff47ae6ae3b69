//! LLM interaction shared by the concept, summary and Markdown stages.
//!
//! This module is intentionally thin: all prompt wording lives in
//! [`crate::prompts`]. It owns two things only: building request options from
//! the config, and turning a reply into either plain text or a typed value.
//!
//! ## Structured output
//!
//! `edgequake-llm` exposes JSON mode (`response_format = "json_object"`) but
//! not schema-constrained decoding. The schema therefore travels in a system
//! message, and the reply is decoded with serde into the target type. Any
//! provider error, malformed JSON or missing required field becomes a
//! [`Deck2NotesError::Generation`]; there is no retry and no fallback.

use crate::config::SummaryConfig;
use crate::error::Deck2NotesError;
use crate::prompts::structured_output_instruction;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A reply wrapped in a single fenced code block, e.g. ```` ```json … ``` ````.
static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*?)\n?```\s*$").unwrap());

/// Ask for a JSON object matching `schema` and decode it as `T`.
///
/// `stage` names the pipeline step in error messages and logs.
pub async fn generate_structured<T: DeserializeOwned>(
    provider: &Arc<dyn LLMProvider>,
    stage: &str,
    prompt: String,
    schema: &serde_json::Value,
    config: &SummaryConfig,
) -> Result<T, Deck2NotesError> {
    let messages = vec![
        ChatMessage::system(structured_output_instruction(schema)),
        ChatMessage::user(prompt),
    ];
    let options = CompletionOptions {
        response_format: Some("json_object".to_string()),
        ..build_options(config)
    };

    let content = chat(provider, stage, &messages, &options).await?;
    serde_json::from_str(strip_outer_fences(&content))
        .map_err(|e| Deck2NotesError::generation(stage, format!("reply does not match schema: {e}")))
}

/// Ask for free text (used for the Markdown rendering).
pub async fn generate_text(
    provider: &Arc<dyn LLMProvider>,
    stage: &str,
    prompt: String,
    config: &SummaryConfig,
) -> Result<String, Deck2NotesError> {
    let messages = vec![ChatMessage::user(prompt)];
    chat(provider, stage, &messages, &build_options(config)).await
}

async fn chat(
    provider: &Arc<dyn LLMProvider>,
    stage: &str,
    messages: &[ChatMessage],
    options: &CompletionOptions,
) -> Result<String, Deck2NotesError> {
    let start = Instant::now();
    let response = provider
        .chat(messages, Some(options))
        .await
        .map_err(|e| Deck2NotesError::generation(stage, e))?;
    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        stage,
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );
    Ok(response.content)
}

/// Build `CompletionOptions` from the summary config.
pub fn build_options(config: &SummaryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Remove one fenced block wrapping the whole reply, if present.
pub fn strip_outer_fences(text: &str) -> &str {
    let trimmed = text.trim();
    match RE_OUTER_FENCES.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}
