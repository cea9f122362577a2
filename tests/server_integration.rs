//! Integration tests for the HTTP tool server.
//!
//! The server runs in-process on an ephemeral port over an in-memory index
//! with the hash embedding provider, and is exercised with `reqwest`.

use anyhow::Result;
use async_trait::async_trait;
use docindex::config::Config;
use docindex::embedding::{DisabledProvider, EmbeddingProvider, HashProvider};
use docindex::index::IndexStore;
use docindex::server::serve;
use docindex::store::memory::InMemoryStore;
use docindex::traits::{Tool, ToolContext, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

// ─── Test Tool ──────────────────────────────────────────────────────

/// A registered tool outside the built-in action set.
struct IndexSizeTool;

#[async_trait]
impl Tool for IndexSizeTool {
    fn name(&self) -> &str {
        "index_size"
    }

    fn description(&self) -> &str {
        "Number of indexed passages"
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _params: Value, ctx: &ToolContext) -> Result<Value> {
        let stats = ctx.index().stats().await?;
        Ok(json!({ "entries": stats.entries }))
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

fn context(store: Arc<InMemoryStore>, provider: Arc<dyn EmbeddingProvider>) -> ToolContext {
    let config = Config::with_store("unused.sqlite");
    let index = IndexStore::new(store, provider, 16);
    ToolContext::new(Arc::new(config), Arc::new(index))
}

/// Start a server on an ephemeral port and return its base URL.
async fn start(ctx: ToolContext) -> String {
    let mut tools = ToolRegistry::with_builtins();
    tools.register(Box::new(IndexSizeTool));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = serve(listener, ctx, Arc::new(tools)).await;
    });
    format!("http://{}", addr)
}

async fn call(base: &str, tool: &str, args: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/tools/{}", base, tool))
        .json(&args)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn write_doc(tmp: &TempDir, name: &str, text: &str) -> String {
    let path = tmp.path().join(name);
    std::fs::write(&path, text).unwrap();
    path.display().to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_and_tool_list() {
    let base = start(context(
        Arc::new(InMemoryStore::new()),
        Arc::new(HashProvider::new(64).unwrap()),
    ))
    .await;

    let health: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let list: Value = reqwest::get(format!("{}/tools/list", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = list["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["ingest", "retrieve", "web_search", "weather", "index_size"]
    );
}

#[tokio::test]
async fn test_ingest_then_retrieve_over_http() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(
        &tmp,
        "bio.txt",
        "Huang Nan is a data scientist who builds retrieval pipelines.",
    );
    let base = start(context(
        Arc::new(InMemoryStore::new()),
        Arc::new(HashProvider::new(64).unwrap()),
    ))
    .await;

    let (status, body) = call(&base, "retrieve", json!({ "query": "who is Huang Nan?" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["status"], "empty_index");

    let (status, body) = call(
        &base,
        "ingest",
        json!({ "file_path": path, "file_type": "txt" }),
    )
    .await;
    assert_eq!(status, 200, "body={}", body);
    assert_eq!(body["result"]["report"]["indexed"], 1);

    let (status, body) = call(&base, "retrieve", json!({ "query": "Huang Nan data scientist" })).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["status"], "ok");
    let passages = body["result"]["passages"].as_array().unwrap();
    assert_eq!(passages.len(), 1);
    assert!(passages[0]["text"].as_str().unwrap().contains("Huang Nan"));

    let (status, body) = call(&base, "index_size", json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["result"]["entries"], 1);
}

#[tokio::test]
async fn test_request_errors() {
    let base = start(context(
        Arc::new(InMemoryStore::new()),
        Arc::new(HashProvider::new(64).unwrap()),
    ))
    .await;

    let (status, body) = call(&base, "no_such_tool", json!({})).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, body) = call(&base, "retrieve", json!({})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, body) = call(
        &base,
        "ingest",
        json!({ "file_path": "/tmp/report.docx", "file_type": "docx" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "config_error");

    let (status, body) = call(
        &base,
        "ingest",
        json!({ "file_path": "/nonexistent/notes.txt", "file_type": "text" }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "io_error");
}

#[tokio::test]
async fn test_provider_failure_is_bad_gateway() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(&tmp, "a.txt", "some text");
    let store = Arc::new(InMemoryStore::new());
    let base = start(context(store, Arc::new(DisabledProvider))).await;

    let (status, body) = call(
        &base,
        "ingest",
        json!({ "file_path": path, "file_type": "text" }),
    )
    .await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "embedding_error");
}

#[tokio::test]
async fn test_embedding_mismatch_is_conflict() {
    let tmp = TempDir::new().unwrap();
    let path = write_doc(&tmp, "a.txt", "indexed with a 64-dim space");
    let store = Arc::new(InMemoryStore::new());

    let first = start(context(store.clone(), Arc::new(HashProvider::new(64).unwrap()))).await;
    let (status, _) = call(
        &first,
        "ingest",
        json!({ "file_path": path, "file_type": "text" }),
    )
    .await;
    assert_eq!(status, 200);

    let second = start(context(store, Arc::new(HashProvider::new(32).unwrap()))).await;
    let (status, body) = call(&second, "retrieve", json!({ "query": "space" })).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], "embedding_mismatch");
}
