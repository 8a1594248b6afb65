use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::agent::ChatModel;
use crate::error::{BotError, Result};
use crate::types::MessageRole;

const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

// Tool calling structures
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

impl Tool {
    pub fn function(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Result of a chat completion
#[derive(Debug)]
pub enum ChatResult {
    /// Model produced a text response
    TextResponse(String),
    /// Model wants to call tools
    ToolCalls {
        tool_calls: Vec<ToolCall>,
        assistant_message: Message,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(MessageRole::Assistant, content)
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::text(MessageRole::Tool, content)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: Vec<Message>, tools: Option<Vec<Tool>>) -> Result<ChatResult> {
        debug!(
            "Sending request to OpenAI API with {} messages",
            messages.len()
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            tools,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::OpenAiApi { status, message });
        }

        let api_response: ChatCompletionResponse = response.json().await?;
        debug!("Received response from OpenAI API");

        into_chat_result(api_response)
    }
}

fn into_chat_result(response: ChatCompletionResponse) -> Result<ChatResult> {
    let message = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BotError::OpenAiResponse("No choices in response".to_string()))?
        .message;

    // Check if response contains tool calls
    if let Some(tool_calls) = message.tool_calls.clone()
        && !tool_calls.is_empty()
    {
        debug!("Received {} tool calls from OpenAI API", tool_calls.len());
        return Ok(ChatResult::ToolCalls {
            tool_calls,
            assistant_message: message,
        });
    }

    Ok(ChatResult::TextResponse(message.content.unwrap_or_default()))
}
