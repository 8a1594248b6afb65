use std::env::{self, VarError};

use log::{debug, error, info};
use strum::IntoEnumIterator;

use crate::agent::{AgentConfig, DEFAULT_SYSTEM_PROMPT, MemoryWindow};
use crate::error::{BotError, Result};
use crate::tools::{ToolKind, ToolSettings};

const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub agent: AgentConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, VarError>,
    {
        let discord_token = lookup("DISCORD_TOKEN").map_err(|e| {
            error!("Failed to load DISCORD_TOKEN from environment: {e}");
            e
        })?;

        let openai_api_key = lookup("OPENAI_API")
            .or_else(|_| lookup("OPENAI_API_KEY"))
            .map_err(|e| {
                error!("Failed to load OPENAI_API from environment: {e}");
                e
            })?;

        let optional = |key: &str| lookup(key).ok().filter(|value| !value.trim().is_empty());

        let openai_model =
            optional("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let openai_base_url = optional("OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let system_prompt =
            optional("SYSTEM_PROMPT").unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let memory_window = match optional("MEMORY_WINDOW") {
            Some(raw) => raw.parse::<MemoryWindow>().map_err(|e| {
                error!("Invalid MEMORY_WINDOW value '{raw}': {e}");
                e
            })?,
            None => MemoryWindow::default(),
        };

        let enabled = match optional("ENABLED_TOOLS") {
            Some(raw) => parse_tool_list(&raw)?,
            None => ToolKind::iter().collect(),
        };

        let tools = ToolSettings {
            enabled,
            google_api_key: optional("GOOGLE_API_KEY"),
            google_cse_id: optional("GOOGLE_CSE_ID"),
            youtube_api_key: optional("YOUTUBE_API_KEY"),
            tmdb_bearer_token: optional("TMDB_BEARER_TOKEN"),
        };

        info!("Configuration loaded successfully");
        debug!("Discord token length: {} characters", discord_token.len());
        debug!("OpenAI API key length: {} characters", openai_api_key.len());
        debug!("OpenAI model: {openai_model}");
        debug!("OpenAI base URL: {openai_base_url}");
        debug!("System prompt length: {} characters", system_prompt.len());
        debug!("Memory window: {memory_window}");
        debug!("Requested tools: {:?}", tools.enabled);

        Ok(Self {
            discord_token,
            agent: AgentConfig {
                openai_api_key,
                openai_model,
                openai_base_url,
                system_prompt,
                memory_window,
                tools,
            },
        })
    }
}

/// Parses a comma-separated tool list such as `calculator, weather`.
fn parse_tool_list(raw: &str) -> Result<Vec<ToolKind>> {
    let mut kinds = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let kind = name.parse::<ToolKind>().map_err(|_| {
            error!("Unknown tool in ENABLED_TOOLS: {name}");
            BotError::Config(format!("unknown tool '{name}' in ENABLED_TOOLS"))
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}
