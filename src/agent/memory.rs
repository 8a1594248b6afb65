//! Windowed conversation memory shared by every request.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::BotError;

const DEFAULT_WINDOW: usize = 5;

/// How many past turns the agent remembers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryWindow {
    /// Keep every turn for the life of the process.
    Unbounded,
    /// Keep only the most recent `k` turns.
    Last(usize),
}

impl Default for MemoryWindow {
    fn default() -> Self {
        MemoryWindow::Last(DEFAULT_WINDOW)
    }
}

impl FromStr for MemoryWindow {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unbounded") || s.eq_ignore_ascii_case("all") {
            return Ok(MemoryWindow::Unbounded);
        }
        s.parse::<usize>().map(MemoryWindow::Last).map_err(|_| {
            BotError::Config(format!(
                "memory window must be a number of turns or 'unbounded', got '{s}'"
            ))
        })
    }
}

impl fmt::Display for MemoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryWindow::Unbounded => write!(f, "unbounded"),
            MemoryWindow::Last(k) => write!(f, "last {k} turns"),
        }
    }
}

/// One exchange: what the user said and what the agent answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub input: String,
    pub output: String,
}

#[derive(Debug)]
pub struct ConversationMemory {
    window: MemoryWindow,
    turns: VecDeque<Turn>,
}

impl ConversationMemory {
    pub fn new(window: MemoryWindow) -> Self {
        Self {
            window,
            turns: VecDeque::new(),
        }
    }

    /// Append a turn, evicting the oldest ones beyond the window.
    pub fn record(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.turns.push_back(Turn {
            input: input.into(),
            output: output.into(),
        });

        if let MemoryWindow::Last(k) = self.window {
            while self.turns.len() > k {
                self.turns.pop_front();
            }
        }
    }

    /// Oldest first.
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
