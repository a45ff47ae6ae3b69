//! Bounded tool-calling loop that publishes notes through a [`DocumentHost`].
//!
//! One *step* is one model turn. When the turn contains tool calls, each is
//! executed against the host and its result appended to the conversation;
//! when it contains none, the agent is done. A hard ceiling on steps stops a
//! model that keeps calling tools forever.
//!
//! ## Tool failures vs. agent failures
//!
//! A failing tool call (bad arguments, HTTP 400 from the host, too many
//! blocks) is reported back to the model as the tool result, so it can fix
//! the request on its next turn. Only LLM failures and the step ceiling end
//! the loop with an error.

use crate::export::notion::{DocumentHost, HostError, PageRef, MAX_BLOCKS_PER_CALL};
use crate::progress::ProgressCallback;
use edgequake_llm::traits::StreamChunk;
use edgequake_llm::{
    ChatMessage, CompletionOptions, FunctionCall, LLMProvider, ToolCall, ToolChoice,
    ToolDefinition, ToolResult,
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CREATE_PAGE: &str = "create_page";
pub const APPEND_BLOCKS: &str = "append_blocks";
pub const RETRIEVE_PAGE: &str = "retrieve_page";

/// Why the agent loop stopped without finishing.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent did not finish within {max_steps} steps")]
    StepLimitExceeded { max_steps: usize },

    #[error("LLM call failed at step {step}: {detail}")]
    Llm { step: usize, detail: String },
}

/// Why a single tool call failed; sent back to the model, never raised.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {detail}")]
    InvalidArguments { tool: String, detail: String },

    #[error(transparent)]
    Host(#[from] HostError),
}

/// What a finished agent run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    /// Model turns used, including the final one.
    pub steps: usize,
    /// First page created during the run, if any.
    pub page: Option<PageRef>,
    /// Blocks successfully appended across all calls.
    pub blocks_appended: usize,
    /// The model's closing message.
    pub reply: String,
}

/// Limits and context for one agent run.
pub struct AgentRun<'a> {
    pub provider: &'a Arc<dyn LLMProvider>,
    pub host: &'a dyn DocumentHost,
    pub instruction: String,
    pub default_parent: Option<String>,
    pub max_steps: usize,
    pub options: CompletionOptions,
    pub progress: Option<&'a ProgressCallback>,
}

/// Drive the agent until it stops calling tools or runs out of steps.
pub async fn run_agent(run: AgentRun<'_>) -> Result<AgentOutcome, AgentError> {
    let tools = tool_definitions();
    let mut toolbox = Toolbox {
        host: run.host,
        default_parent: run.default_parent,
        page: None,
        blocks_appended: 0,
    };
    let mut messages = vec![ChatMessage::user(run.instruction)];

    for step in 1..=run.max_steps {
        if let Some(cb) = run.progress {
            cb.on_agent_step(step, run.max_steps);
        }

        let turn = next_turn(run.provider, &messages, &tools, &run.options)
            .await
            .map_err(|detail| AgentError::Llm { step, detail })?;

        if turn.tool_calls.is_empty() {
            info!("Agent finished after {} steps", step);
            return Ok(AgentOutcome {
                steps: step,
                page: toolbox.page,
                blocks_appended: toolbox.blocks_appended,
                reply: turn.content,
            });
        }

        debug!("Step {}: {} tool calls", step, turn.tool_calls.len());
        messages.push(ChatMessage::assistant_with_tools(
            turn.content,
            turn.tool_calls.clone(),
        ));
        for call in &turn.tool_calls {
            let result = match toolbox.dispatch(call).await {
                Ok(value) => ToolResult::new(&call.id, value.to_string()),
                Err(e) => {
                    warn!("Tool {} failed: {}", call.name(), e);
                    ToolResult::error(&call.id, e)
                }
            };
            messages.push(ChatMessage::tool_result(result.tool_call_id, result.content));
        }
    }

    Err(AgentError::StepLimitExceeded {
        max_steps: run.max_steps,
    })
}

/// Tool schemas offered to the model.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let mut tools = vec![
        ToolDefinition::function(
            CREATE_PAGE,
            "Create a new Notion page and return its id and url.",
            json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Page title" },
                    "parent_page_id": {
                        "type": "string",
                        "description": "Parent page id; omit to use the configured parent"
                    }
                },
                "required": ["title"]
            }),
        ),
        ToolDefinition::function(
            APPEND_BLOCKS,
            "Append up to 100 Notion block objects to a page.",
            json!({
                "type": "object",
                "properties": {
                    "page_id": { "type": "string" },
                    "blocks": {
                        "type": "array",
                        "maxItems": MAX_BLOCKS_PER_CALL,
                        "items": { "type": "object" }
                    }
                },
                "required": ["page_id", "blocks"]
            }),
        ),
        ToolDefinition::function(
            RETRIEVE_PAGE,
            "Fetch a page's title, parent and block outline for verification.",
            json!({
                "type": "object",
                "properties": { "page_id": { "type": "string" } },
                "required": ["page_id"]
            }),
        ),
    ];
    // Block objects are free-form, which strict schemas cannot express.
    for tool in &mut tools {
        tool.function.strict = None;
    }
    tools
}

#[derive(Debug, Default)]
struct Turn {
    content: String,
    tool_calls: Vec<ToolCall>,
}

async fn next_turn(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    tools: &[ToolDefinition],
    options: &CompletionOptions,
) -> Result<Turn, String> {
    if !provider.supports_tool_streaming() {
        let response = provider
            .chat_with_tools(messages, tools, Some(ToolChoice::auto()), Some(options))
            .await
            .map_err(|e| e.to_string())?;
        return Ok(Turn {
            content: response.content,
            tool_calls: response.tool_calls,
        });
    }

    let mut stream = provider
        .chat_with_tools_stream(messages, tools, Some(ToolChoice::auto()), Some(options))
        .await
        .map_err(|e| e.to_string())?;

    let mut turn = Turn::default();
    let mut partial: BTreeMap<usize, (String, String, String)> = BTreeMap::new();
    while let Some(chunk) = stream.next().await {
        match chunk.map_err(|e| e.to_string())? {
            StreamChunk::Content(text) => turn.content.push_str(&text),
            StreamChunk::ToolCallDelta {
                index,
                id,
                function_name,
                function_arguments,
            } => {
                let (call_id, name, args) = partial.entry(index).or_default();
                if let Some(id) = id.filter(|id| !id.is_empty()) {
                    *call_id = id;
                }
                if let Some(n) = function_name {
                    name.push_str(&n);
                }
                if let Some(a) = function_arguments {
                    args.push_str(&a);
                }
            }
            StreamChunk::ThinkingContent { .. } => {}
            StreamChunk::Finished { .. } => break,
        }
    }

    turn.tool_calls = partial
        .into_iter()
        .map(|(index, (id, name, arguments))| ToolCall {
            id: if id.is_empty() { format!("call_{index}") } else { id },
            call_type: "function".to_string(),
            function: FunctionCall { name, arguments },
        })
        .collect();
    Ok(turn)
}

#[derive(Deserialize)]
struct CreatePageArgs {
    title: String,
    #[serde(default)]
    parent_page_id: Option<String>,
}

#[derive(Deserialize)]
struct AppendBlocksArgs {
    page_id: String,
    blocks: Vec<Value>,
}

#[derive(Deserialize)]
struct RetrievePageArgs {
    page_id: String,
}

struct Toolbox<'a> {
    host: &'a dyn DocumentHost,
    default_parent: Option<String>,
    page: Option<PageRef>,
    blocks_appended: usize,
}

impl Toolbox<'_> {
    async fn dispatch(&mut self, call: &ToolCall) -> Result<Value, ToolError> {
        match call.name() {
            CREATE_PAGE => {
                let args: CreatePageArgs = parse_args(call)?;
                let parent = args.parent_page_id.or_else(|| self.default_parent.clone());
                let page = self.host.create_page(parent.as_deref(), &args.title).await?;
                info!("Created page {}", page.url);
                if self.page.is_none() {
                    self.page = Some(page.clone());
                }
                Ok(json!({ "id": page.id, "url": page.url }))
            }
            APPEND_BLOCKS => {
                let args: AppendBlocksArgs = parse_args(call)?;
                if args.blocks.len() > MAX_BLOCKS_PER_CALL {
                    return Err(HostError::TooManyBlocks {
                        count: args.blocks.len(),
                    }
                    .into());
                }
                let added = self.host.append_blocks(&args.page_id, &args.blocks).await?;
                self.blocks_appended += added;
                Ok(json!({ "appended": added }))
            }
            RETRIEVE_PAGE => {
                let args: RetrievePageArgs = parse_args(call)?;
                Ok(self.host.retrieve_page(&args.page_id).await?)
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(call: &ToolCall) -> Result<T, ToolError> {
    call.parse_arguments().map_err(|e| ToolError::InvalidArguments {
        tool: call.name().to_string(),
        detail: e.to_string(),
    })
}
