//! Records passed between pipeline stages.
//!
//! Every stage hands its output to the next by value, so these types are
//! plain data: `Clone`, comparable, and serde-serialisable. The LLM-facing
//! types ([`Concepts`], [`Summary`]) also carry the JSON Schema that is sent
//! alongside the prompt, so the shape the model is asked for and the shape
//! serde accepts are defined side by side.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The two deck formats the extractor understands, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckFormat {
    Pdf,
    Pptx,
}

impl DeckFormat {
    /// Value stored under the `file_type` metadata key.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeckFormat::Pdf => "pdf",
            DeckFormat::Pptx => "pptx",
        }
    }

    /// Metadata key holding the unit count (`page_count` or `slide_count`).
    pub fn count_key(&self) -> &'static str {
        match self {
            DeckFormat::Pdf => "page_count",
            DeckFormat::Pptx => "slide_count",
        }
    }
}

impl fmt::Display for DeckFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounding box of a picture shape, in EMU (the deck's native unit).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

/// Raw content of one slide or page, straight from the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// 1-based position in the deck.
    pub slide_number: usize,
    /// All text on the slide; may be empty.
    pub text: String,
    /// Picture placements; always empty for PDF input.
    pub images: Vec<ImageDescriptor>,
    /// `file_type` plus `page_count` / `slide_count`.
    pub metadata: BTreeMap<String, String>,
}

/// A slide with its detected topic; `main_text` is the record's text unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSlide {
    pub slide_number: usize,
    pub main_text: String,
    pub topic: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// One topic identified by the concept-extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub topic: String,
    pub key_ideas: Vec<String>,
}

/// Wrapper object the concept-extraction call must return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concepts {
    pub concepts: Vec<Concept>,
}

impl Concepts {
    /// JSON Schema describing the expected reply.
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "concepts": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": { "type": "string" },
                            "key_ideas": { "type": "array", "items": { "type": "string" } }
                        },
                        "required": ["topic", "key_ideas"]
                    }
                }
            },
            "required": ["concepts"]
        })
    }
}

/// Study notes for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_terms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_explanation: Option<String>,
    pub summary: String,
    pub key_insights: Vec<String>,
    pub questions: Vec<String>,
}

/// The final structured summary handed to an exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub topics: Vec<TopicSummary>,
}

impl Summary {
    /// JSON Schema describing the expected reply.
    pub fn json_schema() -> Value {
        let strings = json!({ "type": "array", "items": { "type": "string" } });
        json!({
            "type": "object",
            "properties": {
                "topics": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": { "type": "string" },
                            "examples": { "type": ["array", "null"], "items": { "type": "string" } },
                            "key_terms": { "type": ["array", "null"], "items": { "type": "string" } },
                            "detailed_explanation": { "type": ["string", "null"] },
                            "summary": { "type": "string" },
                            "key_insights": strings,
                            "questions": strings
                        },
                        "required": ["topic", "summary", "key_insights", "questions"]
                    }
                }
            },
            "required": ["topics"]
        })
    }
}

/// Deck facts available without any LLM call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckMetadata {
    pub path: PathBuf,
    pub file_type: DeckFormat,
    pub slide_count: usize,
}

/// Where an exporter put the notes: a file path or a page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_summary_optional_fields_may_be_absent() {
        let raw = r#"{
            "topic": "Limits",
            "summary": "Behaviour near a point.",
            "key_insights": ["approach, not arrive"],
            "questions": ["What is a one-sided limit?"]
        }"#;
        let t: TopicSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(t.examples, None);
        assert_eq!(t.key_terms, None);
        assert_eq!(t.detailed_explanation, None);
    }

    #[test]
    fn topic_summary_rejects_missing_required_field() {
        let raw = r#"{ "topic": "Limits", "summary": "s", "key_insights": [] }"#;
        assert!(serde_json::from_str::<TopicSummary>(raw).is_err());
    }

    #[test]
    fn schemas_require_wrapper_keys() {
        assert_eq!(Concepts::json_schema()["required"][0], "concepts");
        assert_eq!(Summary::json_schema()["required"][0], "topics");
    }

    #[test]
    fn deck_format_keys() {
        assert_eq!(DeckFormat::Pdf.count_key(), "page_count");
        assert_eq!(DeckFormat::Pptx.count_key(), "slide_count");
        assert_eq!(DeckFormat::Pptx.to_string(), "pptx");
    }
}
