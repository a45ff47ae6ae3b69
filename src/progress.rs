//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to be told when
//! each stage starts and finishes, and how far the publishing agent has got.
//!
//! # Why callbacks instead of channels?
//!
//! The library stays ignorant of how the host application reports progress:
//! the CLI drives an `indicatif` spinner, a server could forward the same
//! events to a websocket. The trait is `Send + Sync` so the callback can be
//! shared with the blocking extraction task.
//!
//! # Example
//!
//! ```rust
//! use edgequake_deck2notes::{PipelineProgressCallback, Stage, SummaryConfig};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl PipelineProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, items: usize) {
//!         eprintln!("{stage}: {items} items");
//!     }
//! }
//!
//! let config = SummaryConfig::builder()
//!     .api_key("sk-test")
//!     .progress_callback(Arc::new(Printer))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The five pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Extract,
    Normalize,
    Concepts,
    Summary,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extract => "extract",
            Stage::Normalize => "normalize",
            Stage::Concepts => "concepts",
            Stage::Summary => "summary",
            Stage::Export => "export",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes.
    ///
    /// `items` is the number of records the stage produced: slides for
    /// extract/normalize, concepts, topics, or `1` for a finished export.
    fn on_stage_complete(&self, stage: Stage, items: usize) {
        let _ = (stage, items);
    }

    /// Called at the start of every publishing-agent turn (1-indexed).
    fn on_agent_step(&self, step: usize, max_steps: usize) {
        let _ = (step, max_steps);
    }

    /// Called once after the exporter reports where the notes went.
    fn on_pipeline_complete(&self, target: &str) {
        let _ = target;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;
