//! External tools the agent can call through the chat-completions tool API.

mod calculator;
mod executor;
mod movie_search;
mod utils;
mod video_search;
mod weather;
mod web_search;
mod wikipedia;

use async_trait::async_trait;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

use crate::error::Result;
use crate::openai::Tool;

pub use calculator::Calculator;
pub use executor::ToolExecutor;
pub use movie_search::MovieSearch;
pub use video_search::VideoSearch;
pub use weather::Weather;
pub use web_search::WebSearch;
pub use wikipedia::Wikipedia;

/// Every tool the bot knows how to offer. The string form is the tool name
/// sent to the model and accepted in `ENABLED_TOOLS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ToolKind {
    Calculator,
    WebSearch,
    Wikipedia,
    Weather,
    VideoSearch,
    MovieSearch,
}

/// Which tools to enable, plus the keys some of them need.
#[derive(Debug, Clone, Default)]
pub struct ToolSettings {
    pub enabled: Vec<ToolKind>,
    pub google_api_key: Option<String>,
    pub google_cse_id: Option<String>,
    pub youtube_api_key: Option<String>,
    pub tmdb_bearer_token: Option<String>,
}

/// A single callable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn description(&self) -> &'static str;

    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;

    /// Run the tool with the raw JSON argument string produced by the model.
    async fn execute(&self, arguments: &str) -> Result<String>;

    fn name(&self) -> String {
        self.kind().to_string()
    }

    fn definition(&self) -> Tool {
        Tool::function(&self.name(), self.description(), self.parameters())
    }
}
