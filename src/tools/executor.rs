//! Tool executor for dispatching tool calls.

use log::{debug, info, warn};
use reqwest::Client;

use crate::error::{BotError, Result};
use crate::openai::Tool;

use super::{
    Calculator, MovieSearch, ToolHandler, ToolKind, ToolSettings, VideoSearch, Weather, WebSearch,
    Wikipedia,
};

/// The set of tools enabled for an agent, dispatched by name.
#[derive(Default)]
pub struct ToolExecutor {
    tools: Vec<Box<dyn ToolHandler>>,
}

impl ToolExecutor {
    pub fn new(tools: Vec<Box<dyn ToolHandler>>) -> Self {
        Self { tools }
    }

    /// Build the enabled tools, skipping any whose credentials are missing.
    pub fn from_settings(settings: &ToolSettings, client: &Client) -> Self {
        let mut tools: Vec<Box<dyn ToolHandler>> = Vec::new();

        for kind in &settings.enabled {
            let tool: Option<Box<dyn ToolHandler>> = match kind {
                ToolKind::Calculator => Some(Box::new(Calculator::new())),
                ToolKind::Wikipedia => Some(Box::new(Wikipedia::new(client.clone()))),
                ToolKind::Weather => Some(Box::new(Weather::new(client.clone()))),
                ToolKind::WebSearch => settings
                    .google_api_key
                    .clone()
                    .zip(settings.google_cse_id.clone())
                    .map(|(api_key, cse_id)| {
                        Box::new(WebSearch::new(client.clone(), api_key, cse_id))
                            as Box<dyn ToolHandler>
                    }),
                ToolKind::VideoSearch => settings.youtube_api_key.clone().map(|api_key| {
                    Box::new(VideoSearch::new(client.clone(), api_key)) as Box<dyn ToolHandler>
                }),
                ToolKind::MovieSearch => settings.tmdb_bearer_token.clone().map(|token| {
                    Box::new(MovieSearch::new(client.clone(), token)) as Box<dyn ToolHandler>
                }),
            };

            match tool {
                Some(tool) => tools.push(tool),
                None => info!("Skipping tool '{kind}': required API key is not configured"),
            }
        }

        let executor = Self::new(tools);
        info!("Enabled tools: {}", executor.names().join(", "));
        executor
    }

    /// Tool definitions offered to the model, or `None` when no tool is enabled.
    pub fn definitions(&self) -> Option<Vec<Tool>> {
        if self.tools.is_empty() {
            return None;
        }
        Some(self.tools.iter().map(|tool| tool.definition()).collect())
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Execute a tool by name with the given JSON arguments
    pub async fn execute(&self, name: &str, arguments: &str) -> Result<String> {
        debug!("Executing tool '{name}' with args: {arguments}");

        let Some(tool) = self.tools.iter().find(|tool| tool.name() == name) else {
            warn!("Unknown tool requested: {name}");
            return Err(BotError::ToolExecution(format!("Unknown tool: {name}")));
        };

        tool.execute(arguments).await
    }
}
