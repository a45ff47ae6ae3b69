//! CLI binary for edgequake-deck2notes.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig` and prints where the notes went.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_deck2notes::{
    digest, export_summary, inspect, ExportTarget, NotionSettings, PipelineProgressCallback,
    ProgressCallback, Stage, SummaryConfig,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner for the running stage and a log
/// line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
    stage_started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);

        Arc::new(Self {
            bar,
            stage_started: Mutex::new(None),
        })
    }

    /// Nothing is drawn before this.
    fn start(&self) {
        self.bar.set_prefix("Preparing");
        self.bar.set_message("Opening deck…");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn elapsed(&self) -> String {
        let secs = self
            .stage_started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract => "Extracting slides",
        Stage::Normalize => "Normalising text",
        Stage::Concepts => "Extracting concepts",
        Stage::Summary => "Writing summary",
        Stage::Export => "Exporting notes",
    }
}

fn stage_unit(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract | Stage::Normalize => "slides",
        Stage::Concepts => "concepts",
        Stage::Summary => "topics",
        Stage::Export => "target",
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        if let Ok(mut t) = self.stage_started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_prefix(stage_label(stage));
        self.bar.set_message(String::new());
    }

    fn on_stage_complete(&self, stage: Stage, items: usize) {
        self.bar.println(format!(
            "  {} {:<20} {:<14} {}",
            green("✓"),
            stage_label(stage),
            dim(&format!("{items} {}", stage_unit(stage))),
            self.elapsed(),
        ));
    }

    fn on_agent_step(&self, step: usize, max_steps: usize) {
        self.bar.set_message(format!("agent step {step}/{max_steps}"));
    }

    fn on_pipeline_complete(&self, _target: &str) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a deck into summary.md
  deck2notes lecture.pptx

  # Choose the output file
  deck2notes lecture.pdf -o notes/lecture-3.md

  # Publish to Notion under a parent page
  deck2notes lecture.pptx --exporter notion --notion-parent 1a2b3c...

  # Inspect a deck (no API key needed)
  deck2notes --inspect-only lecture.pptx

  # Also print the structured summary as JSON
  deck2notes --json lecture.pdf > summary.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  NOTION_TOKEN            Notion integration token (--exporter notion)
  NOTION_VERSION          Notion-Version header (default 2022-06-28)
  NOTION_PARENT_PAGE_ID   Parent page for published notes
  RUST_LOG                Override the log filter (e.g. edgequake_deck2notes=debug)

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Summarise:       deck2notes lecture.pptx -o lecture.md

  For Notion, share the parent page with your integration first; without
  a parent the page is created at workspace level.
"#;

/// Turn PDF and PPTX lecture decks into study notes.
#[derive(Parser, Debug)]
#[command(
    name = "deck2notes",
    version,
    about = "Turn PDF and PPTX lecture decks into study notes using an LLM",
    long_about = "Extract the text of every slide, group it into core concepts, and write a \
summary with key insights and review questions per topic. Notes are written to a Markdown file \
or published as a Notion page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Slide deck to summarise (.pdf or .pptx).
    source: PathBuf,

    /// Markdown output file (markdown exporter only).
    #[arg(short, long, env = "DECK2NOTES_OUTPUT", default_value = "summary.md")]
    output: PathBuf,

    /// Where the notes go.
    #[arg(long, env = "DECK2NOTES_EXPORTER", value_enum, default_value = "markdown")]
    exporter: ExporterArg,

    /// OpenAI API key.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// LLM model ID.
    #[arg(long, env = "DECK2NOTES_MODEL", default_value = "gpt-4.1-mini")]
    model: String,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "DECK2NOTES_TEMPERATURE", default_value_t = 0.5)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "DECK2NOTES_MAX_TOKENS", default_value_t = 16384)]
    max_tokens: usize,

    /// Notion integration token.
    #[arg(long, env = "NOTION_TOKEN", hide_env_values = true)]
    notion_token: Option<String>,

    /// Notion-Version header.
    #[arg(long, env = "NOTION_VERSION", default_value = "2022-06-28")]
    notion_version: String,

    /// Parent page ID for the published notes.
    #[arg(long, env = "NOTION_PARENT_PAGE_ID")]
    notion_parent: Option<String>,

    /// Maximum publishing-agent turns.
    #[arg(long, env = "DECK2NOTES_MAX_AGENT_STEPS", default_value_t = 50,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_agent_steps: u32,

    /// Print deck metadata only, no summarisation.
    #[arg(long)]
    inspect_only: bool,

    /// JSON output: metadata with --inspect-only, otherwise the summary.
    #[arg(long, env = "DECK2NOTES_JSON")]
    json: bool,

    /// Disable progress spinner.
    #[arg(long, env = "DECK2NOTES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECK2NOTES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DECK2NOTES_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExporterArg {
    Markdown,
    Notion,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the user-facing feedback; keep INFO logs out of
    // its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.source)
            .await
            .context("Failed to inspect deck")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", meta.path.display());
            println!("Type:         {}", meta.file_type);
            println!("Slides:       {}", meta.slide_count);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let config = build_config(&cli, spinner.clone().map(|cb| cb as ProgressCallback))?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    if let Some(ref spinner) = spinner {
        spinner.start();
    }
    let start = Instant::now();
    let outcome = async {
        let summary = digest(&cli.source, &config)
            .await
            .context("Summarisation failed")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
            );
        }
        let receipt = export_summary(&summary, &config)
            .await
            .context("Export failed")?;
        anyhow::Ok((summary, receipt))
    }
    .await;
    let (summary, receipt) = match outcome {
        Ok(done) => done,
        Err(e) => {
            if let Some(ref spinner) = spinner {
                spinner.bar.finish_and_clear();
            }
            return Err(e);
        }
    };

    if !cli.quiet {
        eprintln!(
            "{}  {} topics  {}ms  →  {}",
            green("✔"),
            summary.topics.len(),
            start.elapsed().as_millis(),
            bold(&receipt.target),
        );
        if cli.exporter == ExporterArg::Notion {
            eprintln!("   {}", cyan("published to Notion"));
        }
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let export = match cli.exporter {
        ExporterArg::Markdown => ExportTarget::Markdown {
            path: cli.output.clone(),
        },
        ExporterArg::Notion => {
            let mut settings = NotionSettings::new(cli.notion_token.clone().unwrap_or_default())
                .api_version(&cli.notion_version)
                .max_agent_steps(cli.max_agent_steps as usize);
            if let Some(parent) = non_blank(&cli.notion_parent) {
                settings = settings.parent_page_id(parent);
            }
            ExportTarget::Notion(settings)
        }
    };

    let mut builder = SummaryConfig::builder()
        .model(&cli.model)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .export(export);

    if let Some(key) = non_blank(&cli.api_key) {
        builder = builder.api_key(key);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Environment-backed flags may be set to an empty string; treat that as unset.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
