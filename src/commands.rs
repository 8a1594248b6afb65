//! Slash commands for managing the chatbot.

use log::info;

use crate::bot::Data;
use crate::error::{BotError, Result};

/// Context type for chatbot commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

/// Clear the chatbot's conversation memory.
#[poise::command(slash_command)]
pub async fn clear(ctx: Context<'_>) -> Result<()> {
    ctx.data().agent().clear_memory().await;
    info!("Conversation memory cleared by {}", ctx.author().tag());

    ctx.say("Chat history cleared ✨").await?;
    Ok(())
}

/// List the tools the chatbot can use.
#[poise::command(slash_command, rename = "tools")]
pub async fn list_tools(ctx: Context<'_>) -> Result<()> {
    let names = ctx.data().agent().tool_names();
    ctx.say(describe_tools(&names)).await?;
    Ok(())
}

fn describe_tools(names: &[String]) -> String {
    if names.is_empty() {
        "No tools are enabled.".to_string()
    } else {
        format!("Enabled tools: {}", names.join(", "))
    }
}

/// Get available chatbot commands.
#[must_use]
pub fn chatbot_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![clear(), list_tools()]
}
