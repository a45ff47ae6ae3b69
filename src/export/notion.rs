//! Notion document host: the operations the publishing agent may call.
//!
//! [`DocumentHost`] is the seam between the agent loop and the outside
//! world. [`NotionHost`] implements it over the Notion REST API with
//! `reqwest`; tests inject an in-memory host instead.

use crate::config::NotionSettings;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Notion rejects larger `children` arrays in a single append.
pub const MAX_BLOCKS_PER_CALL: usize = 100;

/// Errors raised by a document host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid host credentials: {0}")]
    InvalidCredentials(String),

    #[error("request to {endpoint} failed: {detail}")]
    Transport { endpoint: String, detail: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response from {endpoint}: {detail}")]
    InvalidResponse { endpoint: String, detail: String },

    #[error("{count} blocks in one call; the limit is {max}", max = MAX_BLOCKS_PER_CALL)]
    TooManyBlocks { count: usize },
}

/// A page created on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub id: String,
    pub url: String,
}

/// Operations a remote document host exposes to the publishing agent.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Create a page titled `title`, under `parent_page_id` or at the
    /// workspace root.
    async fn create_page(
        &self,
        parent_page_id: Option<&str>,
        title: &str,
    ) -> Result<PageRef, HostError>;

    /// Append content blocks to a page; returns how many were added.
    ///
    /// Callers keep `blocks` within [`MAX_BLOCKS_PER_CALL`].
    async fn append_blocks(&self, page_id: &str, blocks: &[Value]) -> Result<usize, HostError>;

    /// Fetch a page's title, parent and top-level block outline.
    async fn retrieve_page(&self, page_id: &str) -> Result<Value, HostError>;
}

/// [`DocumentHost`] backed by the Notion REST API.
pub struct NotionHost {
    client: Client,
    base_url: String,
}

impl NotionHost {
    /// Build an authenticated client and verify the token with `GET /users/me`.
    pub async fn connect(settings: &NotionSettings) -> Result<Self, HostError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", settings.token.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|e| HostError::InvalidCredentials(e.to_string()))?,
        );
        headers.insert(
            "notion-version",
            HeaderValue::from_str(&settings.api_version)
                .map_err(|e| HostError::InvalidCredentials(format!("Notion-Version: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| HostError::Transport {
                endpoint: settings.base_url.clone(),
                detail: e.to_string(),
            })?;

        let host = Self {
            client,
            base_url: settings.base_url.clone(),
        };
        let me = host.send("users/me", host.client.get(host.url("users/me"))).await?;
        debug!("Notion session opened as {}", bot_name(&me));
        Ok(host)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Value, HostError> {
        let response = request.send().await.map_err(|e| HostError::Transport {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(HostError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| HostError::InvalidResponse {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            })
    }
}

#[async_trait]
impl DocumentHost for NotionHost {
    async fn create_page(
        &self,
        parent_page_id: Option<&str>,
        title: &str,
    ) -> Result<PageRef, HostError> {
        let body = create_page_body(parent_page_id, title);
        let page = self
            .send("pages", self.client.post(self.url("pages")).json(&body))
            .await?;
        let field = |name: &str| {
            page.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| HostError::InvalidResponse {
                    endpoint: "pages".into(),
                    detail: format!("missing `{name}`"),
                })
        };
        Ok(PageRef {
            id: field("id")?,
            url: field("url")?,
        })
    }

    async fn append_blocks(&self, page_id: &str, blocks: &[Value]) -> Result<usize, HostError> {
        let endpoint = format!("blocks/{page_id}/children");
        let reply = self
            .send(
                &endpoint,
                self.client
                    .patch(self.url(&endpoint))
                    .json(&json!({ "children": blocks })),
            )
            .await?;
        Ok(reply
            .get("results")
            .and_then(Value::as_array)
            .map_or(blocks.len(), Vec::len))
    }

    async fn retrieve_page(&self, page_id: &str) -> Result<Value, HostError> {
        let page_endpoint = format!("pages/{page_id}");
        let page = self
            .send(&page_endpoint, self.client.get(self.url(&page_endpoint)))
            .await?;
        let children_endpoint = format!("blocks/{page_id}/children");
        let children = self
            .send(
                &children_endpoint,
                self.client
                    .get(self.url(&children_endpoint))
                    .query(&[("page_size", MAX_BLOCKS_PER_CALL)]),
            )
            .await?;
        Ok(page_outline(&page, &children))
    }
}

/// Request body for `POST /pages`.
pub fn create_page_body(parent_page_id: Option<&str>, title: &str) -> Value {
    let parent = match parent_page_id {
        Some(id) => json!({ "type": "page_id", "page_id": id }),
        None => json!({ "type": "workspace", "workspace": true }),
    };
    json!({
        "parent": parent,
        "properties": {
            "title": { "title": [ { "type": "text", "text": { "content": title } } ] }
        }
    })
}

/// Compact view of a page for the agent's verification phase.
pub fn page_outline(page: &Value, children: &Value) -> Value {
    let title = page
        .pointer("/properties/title/title")
        .and_then(Value::as_array)
        .map(|parts| plain_text(parts))
        .unwrap_or_default();
    let blocks: Vec<Value> = children
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .map(|block| {
                    let kind = block.get("type").and_then(Value::as_str).unwrap_or("unknown");
                    let text = block
                        .pointer(&format!("/{kind}/rich_text"))
                        .and_then(Value::as_array)
                        .map(|parts| plain_text(parts))
                        .unwrap_or_default();
                    json!({ "type": kind, "text": text })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "id": page.get("id").cloned().unwrap_or(Value::Null),
        "url": page.get("url").cloned().unwrap_or(Value::Null),
        "title": title,
        "parent": page.get("parent").cloned().unwrap_or(Value::Null),
        "block_count": blocks.len(),
        "has_more": children.get("has_more").cloned().unwrap_or(Value::Bool(false)),
        "blocks": blocks,
    })
}

fn plain_text(parts: &[Value]) -> String {
    parts
        .iter()
        .filter_map(|p| p.get("plain_text").or_else(|| p.pointer("/text/content")))
        .filter_map(Value::as_str)
        .collect()
}

/// Display name of the integration behind a `users/me` response.
fn bot_name(me: &serde_json::Value) -> &str {
    me.get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("<unnamed bot>")
}
