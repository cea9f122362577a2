//! Tool trait and capability table.
//!
//! Every capability an agent can invoke is a [`Tool`]. The
//! [`ToolRegistry`] is the capability table: it lists tools for discovery
//! and routes a typed [`Action`] to the tool that handles it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ToolRegistry                 │
//! │  ┌────────┐ ┌──────────┐ ┌──────────┐ ┌────┐ │
//! │  │ ingest │ │ retrieve │ │web_search│ │ wx │ │
//! │  └───┬────┘ └────┬─────┘ └────┬─────┘ └─┬──┘ │
//! └──────┼───────────┼────────────┼─────────┼────┘
//!        ▼           ▼            ▼         ▼
//!    IndexStore  IndexStore    Tavily   OpenWeather
//! ```
//!
//! # Usage
//!
//! ```rust
//! use docindex::traits::ToolRegistry;
//!
//! let tools = ToolRegistry::with_builtins();
//! assert!(tools.find("retrieve").is_some());
//! ```

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use docindex_core::models::{DocType, QueryHit};

use crate::action::Action;
use crate::config::Config;
use crate::index::IndexStore;
use crate::ingest::ingest_file;
use crate::web_tools::{WeatherTool, WebSearchTool};

// ═══════════════════════════════════════════════════════════════════════
// Tool Trait
// ═══════════════════════════════════════════════════════════════════════

/// A capability that agents can discover and call.
///
/// Tools are exposed via `GET /tools/list` for discovery and
/// `POST /tools/{name}` for invocation, and through `dix tools call`.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use anyhow::Result;
/// use serde_json::{json, Value};
/// use docindex::traits::{Tool, ToolContext};
///
/// pub struct IndexSizeTool;
///
/// #[async_trait]
/// impl Tool for IndexSizeTool {
///     fn name(&self) -> &str { "index_size" }
///     fn description(&self) -> &str { "Number of indexed passages" }
///
///     fn parameters_schema(&self) -> Value {
///         json!({ "type": "object", "properties": {} })
///     }
///
///     async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
///         let stats = ctx.index().stats().await?;
///         Ok(json!({ "entries": stats.entries }))
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Route path (`POST /tools/{name}`) and discovery name.
    fn name(&self) -> &str;

    /// One-line description agents use to decide whether to call the tool.
    fn description(&self) -> &str;

    /// JSON Schema (`type: "object"`) for the tool's arguments.
    fn parameters_schema(&self) -> Value;

    /// Run the tool. The returned value is wrapped in `{ "result": ... }`
    /// by the HTTP server.
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value>;
}

// ═══════════════════════════════════════════════════════════════════════
// ToolContext
// ═══════════════════════════════════════════════════════════════════════

/// Shared state handed to every tool invocation.
///
/// Holds the configuration, the one [`IndexStore`] all ingest and retrieve
/// calls go through, and a pooled HTTP client for the web tools.
#[derive(Clone)]
pub struct ToolContext {
    config: Arc<Config>,
    index: Arc<IndexStore>,
    http: reqwest::Client,
}

impl ToolContext {
    pub fn new(config: Arc<Config>, index: Arc<IndexStore>) -> Self {
        Self {
            config,
            index,
            http: reqwest::Client::new(),
        }
    }

    /// Open the configured index and build a context around it.
    pub async fn open(config: Config) -> Result<Self> {
        let index = IndexStore::open(&config).await?;
        Ok(Self::new(Arc::new(config), Arc::new(index)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Built-in Tool Implementations
// ═══════════════════════════════════════════════════════════════════════

/// Parse `params` as the action this tool handles.
pub(crate) fn parse_action(tool: &dyn Tool, params: Value) -> Result<Action> {
    Action::from_call(tool.name(), params)
}

/// Loads a text or PDF file into the index.
pub struct IngestTool;

#[async_trait]
impl Tool for IngestTool {
    fn name(&self) -> &str {
        "ingest"
    }

    fn description(&self) -> &str {
        "Load an uploaded TXT or PDF file into the knowledge base for later retrieval"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string", "description": "Path of the uploaded file" },
                "file_type": { "type": "string", "enum": ["txt", "text", "pdf"], "description": "File type" }
            },
            "required": ["file_path", "file_type"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let (file_path, file_type) = match parse_action(self, params)? {
            Action::Ingest {
                file_path,
                file_type,
            } => (file_path, file_type),
            other => bail!("ingest cannot handle {}", other.tool_name()),
        };

        let doc_type: DocType = file_type.parse()?;
        let config = ctx.config();
        let report = ingest_file(
            ctx.index(),
            std::path::Path::new(&file_path),
            doc_type,
            &config.chunking.params()?,
            config.ingest.upsert_batch,
        )
        .await?;

        Ok(json!({
            "message": format!(
                "Processed {} file {}: {} chunks added to the knowledge base.",
                doc_type.as_str().to_uppercase(),
                report.source,
                report.indexed
            ),
            "report": report,
        }))
    }
}

/// Top-k passages from the ingested documents.
pub struct RetrieveTool;

#[async_trait]
impl Tool for RetrieveTool {
    fn name(&self) -> &str {
        "retrieve"
    }

    fn description(&self) -> &str {
        "Retrieve relevant passages from uploaded documents"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Retrieval query" },
                "k": { "type": "integer", "minimum": 1, "description": "Number of passages", "default": 3 }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let (query, k) = match parse_action(self, params)? {
            Action::Retrieve { query, k } => (query, k),
            other => bail!("retrieve cannot handle {}", other.tool_name()),
        };
        let k = k.unwrap_or(ctx.config().retrieval.top_k);

        match ctx.index().query(&query, k).await {
            Ok(hits) => Ok(json!({
                "status": "ok",
                "text": format_passages(&hits),
                "passages": hits,
            })),
            Err(e) if e.is_empty_index() => Ok(json!({
                "status": "empty_index",
                "message": "No documents have been uploaded yet. Use the ingest tool to upload a document first.",
                "passages": [],
            })),
            Err(e) => Err(e.into()),
        }
    }
}

/// Number the passages for splicing into an agent's reply.
pub fn format_passages(hits: &[QueryHit]) -> String {
    let mut out = String::from("Relevant passages from the uploaded documents:\n\n");
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!("Passage {}:\n{}\n\n", i + 1, hit.text));
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════

/// The capability table.
///
/// Use [`ToolRegistry::with_builtins`] for the standard `ingest`,
/// `retrieve`, `web_search`, and `weather` tools, then optionally
/// [`register`](ToolRegistry::register) more.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(IngestTool));
        registry.register(Box::new(RetrieveTool));
        registry.register(Box::new(WebSearchTool));
        registry.register(Box::new(WeatherTool));
        registry
    }

    /// Register a tool. [`find`](ToolRegistry::find) returns the first
    /// tool registered under a name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn tools(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Route an action to the tool registered under its name.
    pub async fn dispatch(&self, action: &Action, ctx: &ToolContext) -> Result<Value> {
        let tool = match self.find(action.tool_name()) {
            Some(tool) => tool,
            None => bail!("no tool registered for {}", action.tool_name()),
        };
        tracing::info!(tool = tool.name(), "dispatching action");
        tool.execute(action.params(), ctx).await
    }

    /// Discovery listing: name, description, and parameter schema per tool.
    pub fn list(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "parameters": t.parameters_schema(),
                })
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
