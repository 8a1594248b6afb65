//! Discord bot core logic and event handling.

use std::sync::Arc;

use log::{debug, error, info};
use poise::{
    Framework, FrameworkOptions, builtins,
    serenity_prelude::{ClientBuilder, Context, FullEvent, GatewayIntents},
};

use crate::agent::{ToolAgent, build_agent};
use crate::chatbot::{handle_bot_mention, should_respond};
use crate::commands::chatbot_commands;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::openai::OpenAiClient;
use crate::types::{BotIdentity, InboundMessage, display_name};

pub struct Data {
    agent: Arc<ToolAgent<OpenAiClient>>,
}

impl Data {
    pub fn agent(&self) -> &Arc<ToolAgent<OpenAiClient>> {
        &self.agent
    }
}

/// Run the Discord bot.
pub async fn run() -> Result<()> {
    info!("Initializing bot");
    let config = Config::from_env()?;

    let agent = Arc::new(build_agent(&config.agent));

    debug!("Setting up gateway intents");
    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    debug!("Building framework");
    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: chatbot_commands(),
            event_handler: |ctx, event, _framework, data| Box::pin(event_handler(ctx, event, data)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                debug!("Registering commands globally");
                builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully");
                Ok(Data { agent })
            })
        })
        .build();

    debug!("Creating Discord client");
    let mut client = ClientBuilder::new(config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting Discord client");

    tokio::select! {
        result = client.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    Ok(())
}

fn bot_identity(ctx: &Context) -> BotIdentity {
    let current = ctx.cache.current_user();
    BotIdentity {
        id: current.id,
        display_name: display_name(&current),
    }
}

async fn event_handler(
    ctx: &Context,
    event: &FullEvent,
    data: &Data,
) -> std::result::Result<(), BotError> {
    if let FullEvent::Message { new_message } = event {
        let bot = bot_identity(ctx);
        if !should_respond(&InboundMessage::from_discord(new_message), &bot) {
            return Ok(());
        }

        // One task per mention
        let http = Arc::clone(&ctx.http);
        let message = new_message.clone();
        let agent = Arc::clone(data.agent());
        tokio::spawn(async move {
            if let Err(e) = handle_bot_mention(&http, &message, agent.as_ref(), &bot).await {
                error!(
                    "Failed to answer message {} from {}: {}",
                    message.id,
                    message.author.tag(),
                    e
                );
            }
        });
    }
    Ok(())
}
