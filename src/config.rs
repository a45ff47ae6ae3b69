//! Configuration types for deck summarisation.
//!
//! Every knob of a run lives in [`SummaryConfig`], built via its
//! [`SummaryConfigBuilder`]. The library never reads the environment: the
//! CLI maps `OPENAI_API_KEY`, `NOTION_TOKEN` and friends onto the builder, so
//! tests and embedding applications pass settings explicitly.
//!
//! # Design choice: builder over constructor
//! Most callers only set an API key and an output path. The builder lets
//! them do exactly that and rely on documented defaults for the rest, while
//! `build()` is the single place that rejects missing credentials.

use crate::error::Deck2NotesError;
use crate::export::notion::DocumentHost;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Output file used by the Markdown exporter when none is configured.
pub const DEFAULT_OUTPUT_PATH: &str = "summary.md";

/// Notion API version sent in the `Notion-Version` header by default.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Ceiling on publishing-agent turns.
pub const DEFAULT_MAX_AGENT_STEPS: usize = 50;

/// Configuration for one deck-to-notes run.
///
/// # Example
/// ```rust
/// use edgequake_deck2notes::SummaryConfig;
///
/// let config = SummaryConfig::builder()
///     .api_key("sk-test")
///     .markdown_output("notes/lecture-3.md")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct SummaryConfig {
    /// OpenAI API key. Required unless `provider` is set.
    pub api_key: Option<String>,

    /// LLM model identifier. Default: `gpt-4.1-mini`.
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `api_key`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for every LLM call. Default: 0.5.
    ///
    /// Summaries benefit from some paraphrasing freedom; the structured
    /// replies are still validated against their schema afterwards.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per call. Default: 16384.
    ///
    /// The summary call returns every topic of the deck in one reply, so
    /// this is sized for a long lecture rather than for a single slide.
    pub max_tokens: usize,

    /// Reject summaries whose `summary`, `key_insights` or `questions` are
    /// empty. Default: true.
    pub require_complete_topics: bool,

    /// Where the finished notes go.
    pub export: ExportTarget,

    /// Pre-constructed document host for the Notion exporter. When unset,
    /// a [`crate::export::notion::NotionHost`] is built from the settings.
    pub host: Option<Arc<dyn DocumentHost>>,

    /// Optional stage-progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            temperature: 0.5,
            max_tokens: 16384,
            require_complete_topics: true,
            export: ExportTarget::default(),
            host: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SummaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("require_complete_topics", &self.require_complete_topics)
            .field("export", &self.export)
            .field("host", &self.host.as_ref().map(|_| "<dyn DocumentHost>"))
            .finish()
    }
}

impl SummaryConfig {
    /// Create a new builder for `SummaryConfig`.
    pub fn builder() -> SummaryConfigBuilder {
        SummaryConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SummaryConfig`].
#[derive(Debug)]
pub struct SummaryConfigBuilder {
    config: SummaryConfig,
}

impl SummaryConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n.max(1);
        self
    }

    pub fn require_complete_topics(mut self, v: bool) -> Self {
        self.config.require_complete_topics = v;
        self
    }

    /// Export to a local Markdown file at `path`.
    pub fn markdown_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.export = ExportTarget::Markdown { path: path.into() };
        self
    }

    /// Publish to Notion with the given settings.
    pub fn notion(mut self, settings: NotionSettings) -> Self {
        self.config.export = ExportTarget::Notion(settings);
        self
    }

    pub fn export(mut self, target: ExportTarget) -> Self {
        self.config.export = target;
        self
    }

    pub fn host(mut self, host: Arc<dyn DocumentHost>) -> Self {
        self.config.host = Some(host);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating credentials.
    pub fn build(self) -> Result<SummaryConfig, Deck2NotesError> {
        let c = &self.config;
        let has_key = c.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        if c.provider.is_none() && !has_key {
            return Err(Deck2NotesError::Configuration(
                "OpenAI API key is missing.\nSet OPENAI_API_KEY or pass --api-key.".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(Deck2NotesError::Configuration("Model name must not be empty".into()));
        }
        if let ExportTarget::Notion(ref notion) = c.export {
            if c.host.is_none() && notion.token.trim().is_empty() {
                return Err(Deck2NotesError::Configuration(
                    "Notion token is missing.\nSet NOTION_TOKEN or pass --notion-token.".into(),
                ));
            }
            if notion.max_agent_steps == 0 {
                return Err(Deck2NotesError::Configuration(
                    "max_agent_steps must be ≥ 1".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Export targets ───────────────────────────────────────────────────────

/// Which exporter runs at the end of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportTarget {
    /// Format the summary as Markdown via the LLM and write it to `path`.
    Markdown { path: PathBuf },
    /// Publish the summary as a Notion page through the tool-calling agent.
    Notion(NotionSettings),
}

impl Default for ExportTarget {
    fn default() -> Self {
        ExportTarget::Markdown {
            path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

/// Connection and agent settings for the Notion exporter.
#[derive(Clone, PartialEq)]
pub struct NotionSettings {
    /// Integration token sent as a bearer credential.
    pub token: String,
    /// Value of the `Notion-Version` header. Default: `2022-06-28`.
    pub api_version: String,
    /// Page under which the notes are created. Without one the agent is
    /// told to create a workspace-level page.
    pub parent_page_id: Option<String>,
    /// API root. Default: `https://api.notion.com/v1`.
    pub base_url: String,
    /// Maximum agent turns before the export is abandoned. Default: 50.
    pub max_agent_steps: usize,
}

impl NotionSettings {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_version: DEFAULT_NOTION_VERSION.to_string(),
            parent_page_id: None,
            base_url: "https://api.notion.com/v1".to_string(),
            max_agent_steps: DEFAULT_MAX_AGENT_STEPS,
        }
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// A blank id leaves the page at workspace level.
    pub fn parent_page_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.parent_page_id = Some(id.trim().to_string()).filter(|id| !id.is_empty());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_agent_steps(mut self, n: usize) -> Self {
        self.max_agent_steps = n;
        self
    }
}

impl fmt::Debug for NotionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotionSettings")
            .field("token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("parent_page_id", &self.parent_page_id)
            .field("base_url", &self.base_url)
            .field("max_agent_steps", &self.max_agent_steps)
            .finish()
    }
}
