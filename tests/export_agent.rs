//! Notion publishing without the network.
//!
//! `MockAgentProvider` scripts the model's tool calls turn by turn, and
//! `MemoryHost` plays the Notion API. Note that an exhausted mock keeps
//! calling an unknown `task_complete` tool, which the agent reports back as
//! a tool error, so a script without a final text turn runs into the step
//! limit.

mod common;

use async_trait::async_trait;
use common::{sample_summary, write_pptx, CONCEPTS_REPLY, SUMMARY_REPLY};
use edgequake_deck2notes::export::agent::{run_agent, AgentError, AgentRun};
use edgequake_deck2notes::{
    digest_and_export, Deck2NotesError, DocumentHost, HostError, NotionExporter, NotionSettings,
    PageRef, PipelineProgressCallback, ProgressCallback, SummaryConfig,
};
use edgequake_llm::providers::MockAgentProvider;
use edgequake_llm::{CompletionOptions, FunctionCall, LLMProvider, ToolCall};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── In-memory host ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredPage {
    parent: Option<String>,
    title: String,
    blocks: Vec<Value>,
}

#[derive(Default)]
struct MemoryHost {
    pages: Mutex<HashMap<String, StoredPage>>,
    append_calls: AtomicUsize,
}

impl MemoryHost {
    fn page(&self, id: &str) -> Option<StoredPage> {
        self.pages.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl DocumentHost for MemoryHost {
    async fn create_page(
        &self,
        parent_page_id: Option<&str>,
        title: &str,
    ) -> Result<PageRef, HostError> {
        let mut pages = self.pages.lock().unwrap();
        let id = format!("page-{}", pages.len() + 1);
        pages.insert(
            id.clone(),
            StoredPage {
                parent: parent_page_id.map(str::to_string),
                title: title.to_string(),
                blocks: Vec::new(),
            },
        );
        Ok(PageRef {
            url: format!("https://www.notion.so/{id}"),
            id,
        })
    }

    async fn append_blocks(&self, page_id: &str, blocks: &[Value]) -> Result<usize, HostError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        let mut pages = self.pages.lock().unwrap();
        let page = pages.get_mut(page_id).ok_or_else(|| HostError::Status {
            endpoint: format!("blocks/{page_id}/children"),
            status: 404,
            body: "object_not_found".into(),
        })?;
        page.blocks.extend_from_slice(blocks);
        Ok(blocks.len())
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, HostError> {
        let page = self.page(page_id).ok_or_else(|| HostError::Status {
            endpoint: format!("pages/{page_id}"),
            status: 404,
            body: "object_not_found".into(),
        })?;
        Ok(json!({
            "id": page_id,
            "title": page.title,
            "block_count": page.blocks.len(),
        }))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        call_type: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": [ { "type": "text", "text": { "content": text } } ] }
    })
}

fn notion_config(
    provider: Arc<dyn LLMProvider>,
    host: Arc<MemoryHost>,
    max_steps: usize,
) -> SummaryConfig {
    SummaryConfig::builder()
        .provider(provider)
        .notion(
            NotionSettings::new("")
                .parent_page_id("parent-123")
                .max_agent_steps(max_steps),
        )
        .host(host)
        .build()
        .unwrap()
}

fn exporter(config: &SummaryConfig) -> NotionExporter {
    match config.export {
        edgequake_deck2notes::ExportTarget::Notion(ref settings) => {
            NotionExporter::new(settings.clone())
        }
        _ => unreachable!("notion_config always selects Notion"),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn agent_creates_fills_and_verifies_page() {
    let mock = Arc::new(MockAgentProvider::new());
    mock.add_tool_response(
        "Creating the page.",
        vec![tool_call("c1", "create_page", json!({ "title": "Graph Search" }))],
    )
    .await;
    mock.add_tool_response(
        "",
        vec![tool_call(
            "c2",
            "append_blocks",
            json!({ "page_id": "page-1", "blocks": [paragraph("BFS"), paragraph("DFS")] }),
        )],
    )
    .await;
    mock.add_tool_response(
        "",
        vec![tool_call("c3", "retrieve_page", json!({ "page_id": "page-1" }))],
    )
    .await;
    mock.add_response("The page is complete.").await;

    let host = Arc::new(MemoryHost::default());
    let provider: Arc<dyn LLMProvider> = mock.clone();
    let config = notion_config(Arc::clone(&provider), Arc::clone(&host), 10);

    let receipt = exporter(&config)
        .export(&sample_summary(), &provider, &config)
        .await
        .unwrap();

    assert_eq!(receipt.target, "https://www.notion.so/page-1");
    let page = host.page("page-1").unwrap();
    assert_eq!(page.title, "Graph Search");
    assert_eq!(page.parent.as_deref(), Some("parent-123"), "configured parent is the default");
    assert_eq!(page.blocks.len(), 2);
    assert_eq!(mock.call_count(), 4);
}

#[tokio::test]
async fn failed_tool_call_is_reported_to_the_model() {
    let mock = Arc::new(MockAgentProvider::new());
    mock.add_tool_response(
        "",
        vec![
            tool_call("c1", "create_page", json!({ "title": "Notes", "parent_page_id": "p9" })),
            tool_call(
                "c2",
                "append_blocks",
                json!({ "page_id": "no-such-page", "blocks": [paragraph("lost")] }),
            ),
        ],
    )
    .await;
    mock.add_tool_response("", vec![tool_call("c3", "append_blocks", json!({ "page_id": 7 }))])
        .await;
    mock.add_tool_response(
        "",
        vec![tool_call(
            "c4",
            "append_blocks",
            json!({ "page_id": "page-1", "blocks": [paragraph("kept")] }),
        )],
    )
    .await;
    mock.add_response("Done.").await;

    let host = MemoryHost::default();
    let provider: Arc<dyn LLMProvider> = mock.clone();
    let outcome = run_agent(AgentRun {
        provider: &provider,
        host: &host,
        instruction: "publish".into(),
        default_parent: None,
        max_steps: 10,
        options: CompletionOptions::default(),
        progress: None,
    })
    .await
    .unwrap();

    assert_eq!(outcome.steps, 4);
    assert_eq!(outcome.reply, "Done.");
    assert_eq!(outcome.blocks_appended, 1);
    assert_eq!(outcome.page.unwrap().id, "page-1");
    assert_eq!(host.page("page-1").unwrap().parent.as_deref(), Some("p9"));
    // The malformed call never reached the host.
    assert_eq!(host.append_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn oversized_append_is_rejected_before_the_host() {
    let blocks: Vec<Value> = (0..101).map(|i| paragraph(&format!("block {i}"))).collect();

    let mock = Arc::new(MockAgentProvider::new());
    mock.add_tool_response(
        "",
        vec![tool_call("c1", "create_page", json!({ "title": "Big" }))],
    )
    .await;
    mock.add_tool_response(
        "",
        vec![tool_call(
            "c2",
            "append_blocks",
            json!({ "page_id": "page-1", "blocks": blocks }),
        )],
    )
    .await;
    mock.add_response("Gave up on the big batch.").await;

    let host = MemoryHost::default();
    let provider: Arc<dyn LLMProvider> = mock.clone();
    let outcome = run_agent(AgentRun {
        provider: &provider,
        host: &host,
        instruction: "publish".into(),
        default_parent: None,
        max_steps: 5,
        options: CompletionOptions::default(),
        progress: None,
    })
    .await
    .unwrap();

    assert_eq!(outcome.blocks_appended, 0);
    assert_eq!(host.append_calls.load(Ordering::SeqCst), 0);
    assert!(host.page("page-1").unwrap().blocks.is_empty());
}

#[tokio::test]
async fn step_limit_is_never_exceeded() {
    // Empty script: the mock keeps calling a tool the agent does not offer.
    let mock = Arc::new(MockAgentProvider::new());
    let host = MemoryHost::default();
    let provider: Arc<dyn LLMProvider> = mock.clone();

    let err = run_agent(AgentRun {
        provider: &provider,
        host: &host,
        instruction: "publish".into(),
        default_parent: None,
        max_steps: 3,
        options: CompletionOptions::default(),
        progress: None,
    })
    .await
    .unwrap_err();

    assert!(matches!(err, AgentError::StepLimitExceeded { max_steps: 3 }));
    assert_eq!(mock.call_count(), 3);
}

#[tokio::test]
async fn step_limit_surfaces_as_export_error() {
    let mock = Arc::new(MockAgentProvider::new());
    let host = Arc::new(MemoryHost::default());
    let provider: Arc<dyn LLMProvider> = mock.clone();
    let config = notion_config(Arc::clone(&provider), host, 2);

    let err = exporter(&config)
        .export(&sample_summary(), &provider, &config)
        .await
        .unwrap_err();

    match err {
        Deck2NotesError::Export { detail } => assert!(detail.contains("2 steps"), "got {detail}"),
        other => panic!("expected Export, got {other}"),
    }
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn finishing_without_a_page_is_export_error() {
    let mock = Arc::new(MockAgentProvider::new());
    mock.add_response("I would rather not.").await;
    let host = Arc::new(MemoryHost::default());
    let provider: Arc<dyn LLMProvider> = mock.clone();
    let config = notion_config(Arc::clone(&provider), host, 5);

    let err = exporter(&config)
        .export(&sample_summary(), &provider, &config)
        .await
        .unwrap_err();
    assert!(matches!(err, Deck2NotesError::Export { .. }), "got {err}");
}

#[derive(Default)]
struct StepCounter {
    steps: Mutex<Vec<(usize, usize)>>,
}

impl PipelineProgressCallback for StepCounter {
    fn on_agent_step(&self, step: usize, max_steps: usize) {
        self.steps.lock().unwrap().push((step, max_steps));
    }
}

#[tokio::test]
async fn deck_to_notion_page_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let deck = dir.path().join("deck.pptx");
    write_pptx(
        &deck,
        &[&["First Slide", "This is the first slide content"], &["Second Slide"]],
    );

    // Concept and summary calls share the mock's queue with the agent turns.
    let mock = Arc::new(MockAgentProvider::new());
    mock.add_response(CONCEPTS_REPLY).await;
    mock.add_response(SUMMARY_REPLY).await;
    mock.add_tool_response(
        "",
        vec![tool_call("c1", "create_page", json!({ "title": "First Slide" }))],
    )
    .await;
    mock.add_tool_response(
        "",
        vec![tool_call(
            "c2",
            "append_blocks",
            json!({ "page_id": "page-1", "blocks": [paragraph("An introduction to the deck.")] }),
        )],
    )
    .await;
    mock.add_response("Published.").await;

    let host = Arc::new(MemoryHost::default());
    let counter = Arc::new(StepCounter::default());
    let config = SummaryConfig::builder()
        .provider(mock.clone())
        .notion(NotionSettings::new("secret_x").parent_page_id("parent-123"))
        .host(host.clone())
        .progress_callback(counter.clone() as ProgressCallback)
        .build()
        .unwrap();

    let receipt = digest_and_export(&deck, &config).await.unwrap();

    assert_eq!(receipt.target, "https://www.notion.so/page-1");
    assert_eq!(host.page("page-1").unwrap().blocks.len(), 1);
    assert_eq!(
        *counter.steps.lock().unwrap(),
        vec![(1, 50), (2, 50), (3, 50)]
    );
}
