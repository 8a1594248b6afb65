//! Web search tool implementation using the Google Custom Search JSON API.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::Result;

use super::utils::{fetch_json, require_text};
use super::{ToolHandler, ToolKind};

const GOOGLE_API_BASE_URL: &str = "https://www.googleapis.com";
const CUSTOM_SEARCH_PATH: &str = "/customsearch/v1";

/// The API caps `num` at 10.
const MAX_RESULTS: i64 = 10;
const DEFAULT_RESULTS: i64 = 5;

/// Arguments for the `web_search` tool
#[derive(Debug, Deserialize)]
struct WebSearchArgs {
    query: String,
    count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// A single search hit returned to the model
#[derive(Debug, Serialize)]
struct SearchResult {
    title: String,
    link: String,
    text: String,
}

pub struct WebSearch {
    client: Client,
    base_url: String,
    api_key: String,
    cse_id: String,
}

impl WebSearch {
    pub fn new(client: Client, api_key: String, cse_id: String) -> Self {
        Self {
            client,
            base_url: GOOGLE_API_BASE_URL.to_string(),
            api_key,
            cse_id,
        }
    }

    /// Point the tool at another API host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn format_results(response: SearchResponse) -> Result<String> {
    if response.items.is_empty() {
        return Ok("No results".to_string());
    }

    let results: Vec<SearchResult> = response
        .items
        .into_iter()
        .map(|item| SearchResult {
            title: item.title,
            link: item.link,
            text: item.snippet,
        })
        .collect();

    Ok(serde_json::to_string_pretty(&results)?)
}

#[async_trait]
impl ToolHandler for WebSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn description(&self) -> &'static str {
        "Search the web for current information, news, or facts. Use when the user \
        asks about recent events or anything that may have changed since your \
        knowledge cutoff."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "count": {
                    "type": "integer",
                    "description": "Number of results (1-10, default 5)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str) -> Result<String> {
        let args: WebSearchArgs = serde_json::from_str(arguments)?;
        let query = require_text(&args.query, "query")?;
        let count = args
            .count
            .unwrap_or(DEFAULT_RESULTS)
            .clamp(1, MAX_RESULTS)
            .to_string();

        debug!("Performing web search for: {query}");

        let url = format!("{}{CUSTOM_SEARCH_PATH}", self.base_url);
        let response: SearchResponse = fetch_json(self.client.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("cx", self.cse_id.as_str()),
            ("q", query),
            ("num", count.as_str()),
        ]))
        .await?;

        debug!("Web search returned {} items", response.items.len());
        format_results(response)
    }
}
