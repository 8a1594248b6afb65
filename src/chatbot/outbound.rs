//! Outbound Discord calls made while answering one message.

use async_trait::async_trait;
use poise::serenity_prelude::{EditMessage, Http, Message as SerenityMessage, MessageId};

use crate::error::Result;

/// Replies, edits and typing indicators scoped to one inbound message.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Reply to the inbound message, pinging its author.
    async fn reply(&self, text: &str) -> Result<MessageId>;

    /// Replace the content of a message previously sent by the bot.
    async fn edit(&self, message_id: MessageId, text: &str) -> Result<()>;

    /// Show the typing indicator in the inbound message's channel.
    async fn typing(&self) -> Result<()>;
}

pub struct DiscordOutbound<'a> {
    http: &'a Http,
    message: &'a SerenityMessage,
}

impl<'a> DiscordOutbound<'a> {
    pub fn new(http: &'a Http, message: &'a SerenityMessage) -> Self {
        Self { http, message }
    }
}

#[async_trait]
impl Outbound for DiscordOutbound<'_> {
    async fn reply(&self, text: &str) -> Result<MessageId> {
        let sent = self.message.reply_ping(self.http, text).await?;
        Ok(sent.id)
    }

    async fn edit(&self, message_id: MessageId, text: &str) -> Result<()> {
        self.message
            .channel_id
            .edit_message(self.http, message_id, EditMessage::new().content(text))
            .await?;
        Ok(())
    }

    async fn typing(&self) -> Result<()> {
        self.message.channel_id.broadcast_typing(self.http).await?;
        Ok(())
    }
}
