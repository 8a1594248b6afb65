//! Common types used throughout the megai bot.

use poise::serenity_prelude::{Message as SerenityMessage, User, UserId};
use serde::{Deserialize, Serialize};

/// Role of a message in the conversation.
///
/// Maps to chat-completions API message roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the human user
    User,
    /// Message from the AI assistant
    Assistant,
    /// System prompt or instructions
    System,
    /// Result from a tool execution
    Tool,
}

/// The bot's own identity, as seen by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: UserId,
    pub display_name: String,
}

/// A user referenced by a mention in a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionedUser {
    pub id: UserId,
    pub display_name: String,
}

/// The parts of an inbound Discord message the bridge reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    pub mentions: Vec<MentionedUser>,
}

impl InboundMessage {
    pub fn from_discord(message: &SerenityMessage) -> Self {
        // Server nickname wins over the account-wide name
        let author_name = message
            .member
            .as_ref()
            .and_then(|member| member.nick.clone())
            .unwrap_or_else(|| display_name(&message.author));

        Self {
            author_id: message.author.id,
            author_name,
            content: message.content.clone(),
            mentions: message
                .mentions
                .iter()
                .map(|user| MentionedUser {
                    id: user.id,
                    display_name: display_name(user),
                })
                .collect(),
        }
    }

    /// Whether `user_id` is among the mentioned users.
    #[must_use]
    pub fn mentions_user(&self, user_id: UserId) -> bool {
        self.mentions.iter().any(|mention| mention.id == user_id)
    }
}

/// Global display name, falling back to the username.
pub fn display_name(user: &User) -> String {
    user.global_name.clone().unwrap_or_else(|| user.name.clone())
}
