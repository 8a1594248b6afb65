//! AI chatbot module - handles bot mentions and conversations.

mod handler;
mod input;
mod outbound;
mod response;
mod status;

pub use handler::{handle_bot_mention, process_mention};
pub use input::{normalize_input, should_respond};
pub use outbound::{DiscordOutbound, Outbound};
pub use response::{MAX_CHUNK_CHARS, chunk_message};
pub use status::{ERROR_REPLY, FAILED, FINISHED, PLEASE_WAIT, ToolUsageLog};
