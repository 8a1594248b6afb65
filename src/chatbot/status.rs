//! Status message texts and the per-request tool-usage log.

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::agent::ToolObserver;

pub const PLEASE_WAIT: &str = "⌛ Please wait...";
pub const FINISHED: &str = "✅ Finished";
pub const FAILED: &str = "❌ Failed";
pub const ERROR_REPLY: &str = "❌Sorry an error occured❌";

/// Longer tool arguments are truncated in status lines.
const MAX_ARGUMENT_CHARS: usize = 150;

/// Append-only record of the tools used while answering one message.
///
/// Subscribers are notified with the line count every time a line is added.
#[derive(Debug)]
pub struct ToolUsageLog {
    lines: Mutex<Vec<String>>,
    progress: watch::Sender<usize>,
}

impl Default for ToolUsageLog {
    fn default() -> Self {
        let (progress, _) = watch::channel(0);
        Self {
            lines: Mutex::default(),
            progress,
        }
    }
}

impl ToolUsageLog {
    /// Receiver that wakes whenever a tool line is appended.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.progress.subscribe()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// One line per tool call, each newline-terminated.
    pub fn render(&self) -> String {
        self.lines()
            .iter()
            .map(|line| format!("{line}\n"))
            .collect()
    }

    /// Status text while the agent is still running.
    pub fn in_progress(&self) -> String {
        format!("{}{PLEASE_WAIT}", self.render())
    }

    pub fn finished(&self) -> String {
        format!("{}{FINISHED}", self.render())
    }

    pub fn failed(&self) -> String {
        format!("{}{FAILED}", self.render())
    }
}

impl ToolObserver for ToolUsageLog {
    fn on_tool_start(&self, tool: &str, input: &str) {
        let mut argument: String = input.chars().take(MAX_ARGUMENT_CHARS).collect();
        if argument.len() < input.len() {
            argument.push('…');
        }
        let count = {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            lines.push(format!("🔧 {tool}: {argument}"));
            lines.len()
        };
        self.progress.send_replace(count);
    }
}
