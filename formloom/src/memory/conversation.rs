//! Windowed chat history: the last `k` user/assistant exchanges.

use serde::{Deserialize, Serialize};

use crate::state::Message;

/// Exchanges kept when not configured otherwise.
pub const DEFAULT_HISTORY_LENGTH: usize = 20;

fn default_window() -> usize {
    DEFAULT_HISTORY_LENGTH
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMemory {
    /// Exchanges (user + assistant pairs) kept.
    #[serde(default = "default_window")]
    k: usize,
    #[serde(default)]
    messages: Vec<Message>,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LENGTH)
    }
}

impl ConversationMemory {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            messages: Vec::new(),
        }
    }

    pub fn window(&self) -> usize {
        self.k
    }

    /// Messages in the window, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Records one exchange and drops the oldest beyond the window.
    pub fn save_context(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.messages.push(Message::user(input));
        self.messages.push(Message::assistant(output));
        let keep = self.k.saturating_mul(2);
        if self.messages.len() > keep {
            let drop = self.messages.len() - keep;
            self.messages.drain(..drop);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Only the last k exchanges are kept, oldest dropped first.
    #[test]
    fn window_trims_to_last_k_exchanges() {
        let mut memory = ConversationMemory::new(2);
        for i in 0..4 {
            memory.save_context(format!("q{}", i), format!("a{}", i));
        }
        let contents: Vec<_> = memory.history().iter().map(Message::content).collect();
        assert_eq!(contents, vec!["q2", "a2", "q3", "a3"]);
    }

    #[test]
    fn zero_window_keeps_nothing() {
        let mut memory = ConversationMemory::new(0);
        memory.save_context("q", "a");
        assert!(memory.history().is_empty());
    }
}
