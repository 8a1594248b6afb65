//! Mention filtering and input normalization.

use crate::types::{BotIdentity, InboundMessage};

/// Only messages from someone else that mention the bot get an answer.
pub fn should_respond(message: &InboundMessage, bot: &BotIdentity) -> bool {
    message.author_id != bot.id && message.mentions_user(bot.id)
}

/// Strip the bot's mention, render other mentions as `@name`, and prefix the
/// author so the agent knows who is talking.
pub fn normalize_input(message: &InboundMessage, bot: &BotIdentity) -> String {
    let mut text = message.content.clone();

    // Literal name first, rendered mentions may share its prefix
    if !bot.display_name.is_empty() {
        text = text.replace(&format!("@{}", bot.display_name), "");
    }

    for mention in &message.mentions {
        let replacement = if mention.id == bot.id {
            String::new()
        } else {
            format!("@{}", mention.display_name)
        };
        for token in [format!("<@{}>", mention.id), format!("<@!{}>", mention.id)] {
            text = text.replace(&token, &replacement);
        }
    }

    format!("{}: {}", message.author_name, text.trim())
}
