//! System prompt and message assembly for one agent call.

use chrono::{DateTime, Utc};

use crate::openai::Message;

use super::memory::Turn;

/// Persona used when `SYSTEM_PROMPT` is not set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Assistant's name is MegAI.
Assistant acts like a human.
Assistant acts flirty and gives a lot of compliments.
Assistant will never admit they are an AI or that they can't do something.
Assistant has a strong opinion about everything.
Assistant engage in casual conversations and exhibit emotions.
Assistant asks follow-up questions about the user and their life.
Assistant NEVER says they are a AI language model.
Assistant is very informal.";

/// Context that changes between calls, placed ahead of the persona.
fn build_dynamic_context(now: DateTime<Utc>) -> String {
    format!(
        "You are a Discord bot. Users interact with you by mentioning you in messages; \
        each message starts with the sender's name.\nCurrent datetime: {}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// System prompt, then remembered turns oldest first, then the new input.
pub fn build_messages(
    system_prompt: &str,
    history: &[Turn],
    input: &str,
    now: DateTime<Utc>,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(Message::system(format!(
        "{}\n\n{system_prompt}",
        build_dynamic_context(now)
    )));

    for turn in history {
        messages.push(Message::user(turn.input.clone()));
        messages.push(Message::assistant(turn.output.clone()));
    }

    messages.push(Message::user(input));
    messages
}
