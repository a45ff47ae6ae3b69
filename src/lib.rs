//! # edgequake-deck2notes
//!
//! Turn lecture slide decks (PDF or PPTX) into structured study notes using
//! a Large Language Model.
//!
//! ## Why this crate?
//!
//! Slides are terse by design: bullet fragments, half sentences, figures
//! without captions. Reading them back weeks later rarely reconstructs the
//! lecture. This crate pulls the text out of every slide, asks an LLM to
//! group it into the lecture's core concepts and then to write a summary,
//! key insights and review questions for each one. The result lands either
//! in a Markdown file or as a page in a Notion workspace.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck (.pdf / .pptx)
//!  │
//!  ├─ 1. Extract    lopdf / zip + quick-xml (CPU-bound, spawn_blocking)
//!  ├─ 2. Normalize  topic = first sentence fragment
//!  ├─ 3. Concepts   LLM, JSON reply decoded into `Concepts`
//!  ├─ 4. Summary    LLM, JSON reply decoded into `Summary`
//!  └─ 5. Export     Markdown file  |  Notion page via tool-calling agent
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_deck2notes::{digest_and_export, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummaryConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .markdown_output("lecture-3.md")
//!         .build()?;
//!     let receipt = digest_and_export("lecture-3.pptx", &config).await?;
//!     eprintln!("notes written to {}", receipt.target);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deck2notes` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-deck2notes = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod digest;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod types;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportTarget, NotionSettings, SummaryConfig, SummaryConfigBuilder};
pub use digest::{digest, digest_and_export, digest_sync, export_summary, inspect};
pub use error::Deck2NotesError;
pub use export::markdown::MarkdownExporter;
pub use export::notion::{DocumentHost, HostError, NotionHost, PageRef};
pub use export::publish::NotionExporter;
pub use export::Exporter;
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use types::{
    Concept, DeckFormat, DeckMetadata, ExportReceipt, ImageDescriptor, NormalizedSlide,
    SlideRecord, Summary, TopicSummary,
};
