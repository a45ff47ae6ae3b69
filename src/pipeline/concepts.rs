//! Concept extraction: normalised slides → topics with key ideas.

use crate::config::SummaryConfig;
use crate::error::Deck2NotesError;
use crate::pipeline::llm::generate_structured;
use crate::prompts::concepts_prompt;
use crate::types::{Concept, Concepts, NormalizedSlide};
use edgequake_llm::LLMProvider;
use std::sync::Arc;
use tracing::info;

pub const STAGE: &str = "concept extraction";

/// Send every slide to the LLM in one call and return the concepts it found.
///
/// The reply is not tied to slide numbers: the model may merge slides into
/// one concept or split a dense slide into several.
pub async fn extract_concepts(
    provider: &Arc<dyn LLMProvider>,
    slides: &[NormalizedSlide],
    config: &SummaryConfig,
) -> Result<Vec<Concept>, Deck2NotesError> {
    let slides_json = serde_json::to_string_pretty(slides)
        .map_err(|e| Deck2NotesError::Internal(format!("serialise slides: {e}")))?;

    let reply: Concepts = generate_structured(
        provider,
        STAGE,
        concepts_prompt(&slides_json),
        &Concepts::json_schema(),
        config,
    )
    .await?;

    info!("Extracted {} concepts from {} slides", reply.concepts.len(), slides.len());
    Ok(reply.concepts)
}
