//! Summary generation: concepts → per-topic study notes.

use crate::config::SummaryConfig;
use crate::error::Deck2NotesError;
use crate::pipeline::llm::generate_structured;
use crate::prompts::summary_prompt;
use crate::types::{Concept, Concepts, Summary, TopicSummary};
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::info;

pub const STAGE: &str = "summary generation";

/// Turn the extracted concepts into a [`Summary`].
///
/// With `config.require_complete_topics` set, a topic whose `summary`,
/// `key_insights` or `questions` came back empty fails the stage.
pub async fn summarize(
    provider: &Arc<dyn LLMProvider>,
    concepts: &[Concept],
    config: &SummaryConfig,
) -> Result<Summary, Deck2NotesError> {
    let wrapper = Concepts {
        concepts: concepts.to_vec(),
    };
    let concepts_json = serde_json::to_string_pretty(&wrapper)
        .map_err(|e| Deck2NotesError::Internal(format!("serialise concepts: {e}")))?;

    let summary: Summary = generate_structured(
        provider,
        STAGE,
        summary_prompt(&concepts_json),
        &Summary::json_schema(),
        config,
    )
    .await?;

    if config.require_complete_topics {
        if let Some(problem) = summary.topics.iter().find_map(incomplete_field) {
            return Err(Deck2NotesError::generation(STAGE, problem));
        }
    }

    info!("Generated summary with {} topics", summary.topics.len());
    Ok(summary)
}

fn incomplete_field(topic: &TopicSummary) -> Option<String> {
    let empty = if topic.summary.trim().is_empty() {
        "summary"
    } else if topic.key_insights.is_empty() {
        "key_insights"
    } else if topic.questions.is_empty() {
        "questions"
    } else {
        return None;
    };
    Some(format!("topic '{}' has an empty `{}`", topic.topic, empty))
}
