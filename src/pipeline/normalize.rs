//! Slide normalisation: carry the text through and pick a topic line.
//!
//! The topic heuristic is deliberately crude: split the text on sentence
//! punctuation, newlines and common bullet glyphs, and take the first
//! non-blank fragment. Slide titles are nearly always the first text box,
//! so this recovers the title without any layout analysis.

use crate::types::{NormalizedSlide, SlideRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence terminators, line breaks and bullet markers.
static FRAGMENT_DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?\n;:•\-*]").expect("valid regex"));

/// Normalise a single slide. Pure and idempotent.
pub fn normalize(slide: &SlideRecord) -> NormalizedSlide {
    NormalizedSlide {
        slide_number: slide.slide_number,
        main_text: slide.text.clone(),
        topic: detect_topic(&slide.text),
        metadata: slide.metadata.clone(),
    }
}

/// Normalise every slide, preserving order.
pub fn normalize_all(slides: &[SlideRecord]) -> Vec<NormalizedSlide> {
    slides.iter().map(normalize).collect()
}

/// First non-empty trimmed fragment of `text`, if any.
pub fn detect_topic(text: &str) -> Option<String> {
    FRAGMENT_DELIMITERS
        .split(text)
        .map(str::trim)
        .find(|fragment| !fragment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn slide(text: &str) -> SlideRecord {
        SlideRecord {
            slide_number: 1,
            text: text.to_string(),
            images: Vec::new(),
            metadata: BTreeMap::from([("file_type".to_string(), "pptx".to_string())]),
        }
    }

    #[test]
    fn topic_is_first_sentence() {
        assert_eq!(
            detect_topic("Main topic. Supporting point. Another point.").as_deref(),
            Some("Main topic")
        );
    }

    #[test]
    fn topic_skips_leading_bullets_and_blank_lines() {
        assert_eq!(detect_topic("\n\n  • Intro\n- second").as_deref(), Some("Intro"));
        assert_eq!(detect_topic("*** : ; Heading").as_deref(), Some("Heading"));
    }

    #[test]
    fn topic_of_empty_or_delimiter_only_text_is_none() {
        assert_eq!(detect_topic(""), None);
        assert_eq!(detect_topic("   \n\t "), None);
        assert_eq!(detect_topic("...!?--**"), None);
    }

    #[test]
    fn normalize_keeps_text_verbatim_and_metadata() {
        let text = "  Title Slide\n• First point\n• Second point \n";
        let n = normalize(&slide(text));
        assert_eq!(n.main_text, text);
        assert_eq!(n.topic.as_deref(), Some("Title Slide"));
        assert_eq!(n.metadata["file_type"], "pptx");
        assert_eq!(n.slide_number, 1);
    }

    #[test]
    fn normalize_is_idempotent() {
        let record = slide("  Graphs: nodes and edges.  ");
        let first = normalize(&record);
        assert_eq!(first, normalize(&record));
        assert_eq!(first.main_text, record.text);
    }

    #[test]
    fn padded_title_is_not_trimmed_from_main_text() {
        let n = normalize(&slide("  Title\n"));
        assert_eq!(n.main_text, "  Title\n");
        assert_eq!(n.topic.as_deref(), Some("Title"));
    }

    #[test]
    fn normalize_all_preserves_order() {
        let mut slides = vec![slide("A"), slide("B"), slide("C")];
        for (i, s) in slides.iter_mut().enumerate() {
            s.slide_number = i + 1;
        }
        let numbers: Vec<usize> = normalize_all(&slides).iter().map(|n| n.slide_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
