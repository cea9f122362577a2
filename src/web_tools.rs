//! Live web tools: Tavily search and OpenWeather current weather.
//!
//! Both are thin pass-throughs. API keys come from `TAVILY_API_KEY` and
//! `OPENWEATHER_API_KEY`; endpoints and defaults from `[tools.*]`.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::action::Action;
use crate::config::{SearchConfig, WeatherConfig};
use crate::traits::{parse_action, Tool, ToolContext};

fn api_key(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!("{} environment variable not set", var),
    }
}

/// Build the OpenWeather current-weather request for `loc`.
pub fn weather_request(
    client: &reqwest::Client,
    config: &WeatherConfig,
    loc: &str,
    api_key: &str,
) -> Result<reqwest::Request> {
    Ok(client
        .get(&config.url)
        .query(&[
            ("q", loc),
            ("appid", api_key),
            ("units", config.units.as_str()),
            ("lang", config.lang.as_str()),
        ])
        .build()?)
}

/// Build the Tavily search request for `query`.
pub fn search_request(
    client: &reqwest::Client,
    config: &SearchConfig,
    query: &str,
    max_results: Option<usize>,
    api_key: &str,
) -> Result<reqwest::Request> {
    Ok(client
        .post(&config.url)
        .bearer_auth(api_key)
        .json(&json!({
            "query": query,
            "max_results": max_results.unwrap_or(config.max_results),
            "topic": config.topic,
        }))
        .build()?)
}

async fn send_json(client: &reqwest::Client, request: reqwest::Request, label: &str) -> Result<Value> {
    let response = client
        .execute(request)
        .await
        .with_context(|| format!("{} request failed", label))?;
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("{} returned a non-JSON body (HTTP {})", label, status))?;
    tracing::debug!(label, %status, "web tool response");
    Ok(body)
}

/// Current weather for a city via OpenWeather. Returns the API's JSON as is.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Current weather for a city; Chinese cities must use their English name (e.g. 'Beijing')"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "loc": { "type": "string", "description": "The location name of the city" }
            },
            "required": ["loc"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let loc = match parse_action(self, params)? {
            Action::Weather { loc } => loc,
            other => bail!("weather cannot handle {}", other.tool_name()),
        };
        let key = api_key("OPENWEATHER_API_KEY")?;
        let request = weather_request(ctx.http(), &ctx.config().tools.weather, &loc, &key)?;
        send_json(ctx.http(), request, "OpenWeather").await
    }
}

/// Web search via the Tavily API.
pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" },
                "max_results": { "type": "integer", "minimum": 1, "description": "Max results", "default": 5 }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<Value> {
        let (query, max_results) = match parse_action(self, params)? {
            Action::WebSearch { query, max_results } => (query, max_results),
            other => bail!("web_search cannot handle {}", other.tool_name()),
        };
        let key = api_key("TAVILY_API_KEY")?;
        let request = search_request(
            ctx.http(),
            &ctx.config().tools.search,
            &query,
            max_results,
            &key,
        )?;
        send_json(ctx.http(), request, "Tavily").await
    }
}
