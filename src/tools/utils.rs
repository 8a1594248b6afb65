//! Shared utility functions for tools.

use reqwest::RequestBuilder;
use reqwest::header::USER_AGENT;
use serde::de::DeserializeOwned;

use crate::error::{BotError, Result};

/// Some public APIs (Wikipedia in particular) reject requests without one.
const TOOL_USER_AGENT: &str = "megai/0.1 (Discord bot)";

/// Maximum number of characters of an error body kept in a tool error.
const MAX_ERROR_BODY: usize = 300;

/// Send a GET-style request and decode the JSON body, turning HTTP failures
/// into tool errors the model can read.
pub async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.header(USER_AGENT, TOOL_USER_AGENT).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(BotError::ToolExecution(format!(
            "request failed ({status}): {body}"
        )));
    }

    Ok(response.json().await?)
}

/// Reject blank string arguments.
pub fn require_text<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BotError::ToolExecution(format!("'{field}' must not be empty")));
    }
    Ok(trimmed)
}
