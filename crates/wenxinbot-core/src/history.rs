//! Conversation history held by a bot.
//!
//! A history is a list of completed turns. Each turn expands into one user
//! message followed by one assistant message when the history is sent to the
//! provider. A user query only becomes part of the history once its reply has
//! arrived, so a failed call never leaves a dangling user message behind.

use crate::types::Message;

/// One completed exchange.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Turn {
    pub query: String,
    pub reply: String,
}

/// Ordered, append-only conversation log.
///
/// Unbounded by default. With [`ChatHistory::with_max_turns`] the first turn
/// (usually the opening prompt) is pinned and only the most recent
/// `max_turns` turns after it are kept.
#[derive(Clone, Debug, Default)]
pub struct ChatHistory {
    turns: Vec<Turn>,
    max_turns: Option<usize>,
}

impl ChatHistory {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps the first turn plus the last `max_turns`.
    pub fn with_max_turns(max_turns: usize) -> Self {
        ChatHistory {
            turns: Vec::new(),
            max_turns: Some(max_turns),
        }
    }

    /// Messages to send to the provider, oldest first.
    pub fn get_messages(&self) -> Vec<Message> {
        self.turns
            .iter()
            .flat_map(|t| [Message::user(&t.query), Message::assistant(&t.reply)])
            .collect()
    }

    /// Record a completed turn.
    pub fn add_message(&mut self, query: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(Turn {
            query: query.into(),
            reply: reply.into(),
        });

        if let Some(max) = self.max_turns {
            let keep = max.saturating_add(1);
            if self.turns.len() > keep {
                let excess = self.turns.len() - keep;
                self.turns.drain(1..1 + excess);
            }
        }
    }

    /// Replace the query of the first turn. No-op on an empty history.
    pub fn change_prompt(&mut self, new_prompt: impl Into<String>) {
        if let Some(first) = self.turns.first_mut() {
            first.query = new_prompt.into();
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn has_history(&self) -> bool {
        !self.turns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Forget every turn (reset conversation).
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_empty_history() {
        let history = ChatHistory::new();
        assert!(history.is_empty());
        assert!(!history.has_history());
        assert!(history.get_messages().is_empty());
    }

    #[test]
    fn test_messages_alternate_in_order() {
        let mut history = ChatHistory::new();
        history.add_message("q1", "a1");
        history.add_message("q2", "a2");
        history.add_message("q3", "a3");

        let messages = history.get_messages();
        assert_eq!(messages.len(), 6);
        for (i, msg) in messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(msg.role, expected);
        }
        assert_eq!(messages[0].content, "q1");
        assert_eq!(messages[3].content, "a2");
        assert_eq!(messages[5].content, "a3");
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut history = ChatHistory::new();
        for i in 0..50 {
            history.add_message(format!("q{i}"), format!("a{i}"));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.turns()[0].query, "q0");
        assert_eq!(history.turns()[49].reply, "a49");
    }

    #[test]
    fn test_window_pins_first_turn() {
        let mut history = ChatHistory::with_max_turns(2);
        for i in 0..5 {
            history.add_message(format!("q{i}"), format!("a{i}"));
        }

        let queries: Vec<&str> = history.turns().iter().map(|t| t.query.as_str()).collect();
        assert_eq!(queries, vec!["q0", "q3", "q4"]);
    }

    #[test]
    fn test_window_with_huge_limit_keeps_everything() {
        let mut history = ChatHistory::with_max_turns(usize::MAX);
        history.add_message("q0", "a0");
        history.add_message("q1", "a1");
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[1].query, "q1");
    }

    #[test]
    fn test_window_not_applied_below_limit() {
        let mut history = ChatHistory::with_max_turns(5);
        history.add_message("q0", "a0");
        history.add_message("q1", "a1");
        assert_eq!(history.len(), 2);
        assert_eq!(history.max_turns(), Some(5));
    }

    #[test]
    fn test_change_prompt() {
        let mut history = ChatHistory::new();
        history.change_prompt("ignored");
        assert!(history.is_empty());

        history.add_message("old prompt", "ok");
        history.add_message("q", "a");
        history.change_prompt("new prompt");
        assert_eq!(history.turns()[0].query, "new prompt");
        assert_eq!(history.turns()[1].query, "q");
    }

    #[test]
    fn test_clear() {
        let mut history = ChatHistory::new();
        history.add_message("q", "a");
        history.clear();
        assert!(history.is_empty());
    }
}
