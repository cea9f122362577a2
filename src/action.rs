//! Requested actions.
//!
//! An agent asks for a capability by name with a JSON argument object.
//! [`Action`] is the typed form of that request: one variant per tool in
//! the capability table, serialized as `{"tool": "...", "args": {...}}`.
//!
//! ```rust
//! use docindex::action::Action;
//! use serde_json::json;
//!
//! let action = Action::from_call("retrieve", json!({ "query": "who wrote it?" })).unwrap();
//! assert_eq!(action, Action::Retrieve { query: "who wrote it?".into(), k: None });
//! assert_eq!(action.tool_name(), "retrieve");
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum Action {
    /// Load a document and add its chunks to the index.
    Ingest { file_path: String, file_type: String },
    /// Top-k passages for a query from the ingested documents.
    Retrieve {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        k: Option<usize>,
    },
    /// Live web search.
    WebSearch {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_results: Option<usize>,
    },
    /// Current weather for a city (English city name).
    Weather { loc: String },
}

impl Action {
    /// Every tool name an action can carry.
    pub const TOOL_NAMES: [&'static str; 4] = ["ingest", "retrieve", "web_search", "weather"];

    pub fn tool_name(&self) -> &'static str {
        match self {
            Action::Ingest { .. } => "ingest",
            Action::Retrieve { .. } => "retrieve",
            Action::WebSearch { .. } => "web_search",
            Action::Weather { .. } => "weather",
        }
    }

    /// The argument object of this action.
    pub fn params(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => map.remove("args").unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    /// Build an action from a tool name and its JSON arguments.
    ///
    /// # Errors
    ///
    /// Fails if the name is not a known tool, an argument is missing or has
    /// the wrong type, or a required string argument is blank.
    pub fn from_call(name: &str, args: Value) -> Result<Self> {
        if !Self::TOOL_NAMES.contains(&name) {
            bail!("unknown tool: {}", name);
        }
        let action: Action = serde_json::from_value(serde_json::json!({
            "tool": name,
            "args": args,
        }))
        .with_context(|| format!("invalid arguments for {}", name))?;
        action.validate()?;
        Ok(action)
    }

    fn validate(&self) -> Result<()> {
        let (field, value) = match self {
            Action::Ingest { file_path, .. } => ("file_path", file_path),
            Action::Retrieve { query, .. } | Action::WebSearch { query, .. } => ("query", query),
            Action::Weather { loc } => ("loc", loc),
        };
        if value.trim().is_empty() {
            bail!("{} must not be empty", field);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged_wire_format() {
        let action = Action::Weather {
            loc: "Beijing".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({ "tool": "weather", "args": { "loc": "Beijing" } })
        );

        let parsed: Action = serde_json::from_value(json!({
            "tool": "web_search",
            "args": { "query": "rust 2024 edition", "max_results": 2 }
        }))
        .unwrap();
        assert_eq!(
            parsed,
            Action::WebSearch {
                query: "rust 2024 edition".to_string(),
                max_results: Some(2)
            }
        );
    }

    #[test]
    fn test_from_call_and_params_agree() {
        let args = json!({ "file_path": "/tmp/a.pdf", "file_type": "pdf" });
        let action = Action::from_call("ingest", args.clone()).unwrap();
        assert_eq!(action.tool_name(), "ingest");
        assert_eq!(action.params(), args);
    }

    #[test]
    fn test_optional_args_omitted() {
        let action = Action::from_call("retrieve", json!({ "query": "q" })).unwrap();
        assert_eq!(action.params(), json!({ "query": "q" }));
    }

    #[test]
    fn test_rejects_bad_calls() {
        assert!(Action::from_call("search_everything", json!({})).is_err());
        assert!(Action::from_call("weather", json!({})).is_err());
        assert!(Action::from_call("weather", json!({ "loc": 3 })).is_err());
        let err = Action::from_call("retrieve", json!({ "query": "   " })).unwrap_err();
        assert!(err.to_string().contains("query must not be empty"));
    }
}
