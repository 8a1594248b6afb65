//! Main handler for bot mentions.

use std::time::Duration;

use log::{debug, error, info, warn};
use poise::serenity_prelude::{Http, Message as SerenityMessage};
use tokio::time::{self, Instant};

use crate::agent::Agent;
use crate::error::Result;
use crate::types::{BotIdentity, InboundMessage};

use super::input::{normalize_input, should_respond};
use super::outbound::{DiscordOutbound, Outbound};
use super::response::{MAX_CHUNK_CHARS, chunk_message};
use super::status::{ERROR_REPLY, PLEASE_WAIT, ToolUsageLog};

/// Discord drops the typing indicator after about ten seconds.
const TYPING_REFRESH_INTERVAL: Duration = Duration::from_secs(8);

/// Answer a Discord message that mentions the bot.
pub async fn handle_bot_mention<A: Agent + ?Sized>(
    http: &Http,
    new_message: &SerenityMessage,
    agent: &A,
    bot: &BotIdentity,
) -> Result<()> {
    let inbound = InboundMessage::from_discord(new_message);
    let outbound = DiscordOutbound::new(http, new_message);
    process_mention(agent, &outbound, &inbound, bot).await
}

/// Filter, acknowledge, run the agent once, then report the outcome.
///
/// While the agent runs, the status message is re-edited each time a tool
/// starts and the typing indicator is refreshed periodically.
///
/// Agent failures are answered with a fixed apology and logged; failures of
/// the outbound calls themselves end the handler with an error.
pub async fn process_mention<A, O>(
    agent: &A,
    outbound: &O,
    inbound: &InboundMessage,
    bot: &BotIdentity,
) -> Result<()>
where
    A: Agent + ?Sized,
    O: Outbound + ?Sized,
{
    if !should_respond(inbound, bot) {
        return Ok(());
    }

    info!(
        "Received message from {} ({}): {}",
        inbound.author_name, inbound.author_id, inbound.content
    );

    let input = normalize_input(inbound, bot);
    debug!("Normalized input: {input}");

    let status = outbound.reply(PLEASE_WAIT).await?;

    if let Err(e) = outbound.typing().await {
        debug!("Failed to broadcast typing indicator: {e}");
    }

    let tool_log = ToolUsageLog::default();
    let mut progress = tool_log.subscribe();
    let mut typing =
        time::interval_at(Instant::now() + TYPING_REFRESH_INTERVAL, TYPING_REFRESH_INTERVAL);

    let run = agent.run(&input, Some(&tool_log));
    tokio::pin!(run);

    let outcome = loop {
        tokio::select! {
            biased;
            result = &mut run => break result,
            Ok(()) = progress.changed() => {
                if let Err(e) = outbound.edit(status, &tool_log.in_progress()).await {
                    warn!("Failed to update status message: {e}");
                }
            }
            _ = typing.tick() => {
                if let Err(e) = outbound.typing().await {
                    debug!("Failed to refresh typing indicator: {e}");
                }
            }
        }
    };

    match outcome {
        Ok(answer) => {
            outbound.edit(status, &tool_log.finished()).await?;

            let chunks = chunk_message(&answer, MAX_CHUNK_CHARS);
            if chunks.is_empty() {
                warn!("No response content generated");
            }
            for chunk in &chunks {
                outbound.reply(chunk).await?;
            }

            info!(
                "Replied to {} in {} message(s): {}",
                inbound.author_name,
                chunks.len(),
                answer
            );
        }
        Err(e) => {
            error!(
                "Error processing message from {}: {}",
                inbound.author_name, e
            );
            outbound.reply(ERROR_REPLY).await?;
            outbound.edit(status, &tool_log.failed()).await?;
        }
    }

    Ok(())
}
