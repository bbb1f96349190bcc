//! Append-only conversation log.

use super::message::ConversationTurn;

/// Number of trailing turns (10 user/assistant pairs) visible to the model.
///
/// Older turns stay in the history but are never rendered into a prompt.
pub const HISTORY_WINDOW_TURNS: usize = 20;

/// Ordered log of the turns exchanged in a chat session.
///
/// Alternation of user and assistant turns is typical but not enforced;
/// nothing is ever removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn at the end of the log.
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// All turns in chronological order.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The most recent [`HISTORY_WINDOW_TURNS`] turns, oldest first.
    pub fn window(&self) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(HISTORY_WINDOW_TURNS);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    fn history_with_pairs(pairs: usize) -> ConversationHistory {
        let mut history = ConversationHistory::new();
        for i in 0..pairs {
            history.push(ConversationTurn::user(format!("question {i}")));
            history.push(ConversationTurn::assistant(format!("answer {i}")));
        }
        history
    }

    #[test]
    fn test_window_returns_everything_when_short() {
        let history = history_with_pairs(3);
        assert_eq!(history.window().len(), 6);
        assert_eq!(history.window()[0].content, "question 0");
    }

    #[test]
    fn test_window_keeps_last_ten_pairs() {
        let history = history_with_pairs(15);

        let window = history.window();
        assert_eq!(window.len(), HISTORY_WINDOW_TURNS);
        assert_eq!(window[0].content, "question 5");
        assert_eq!(window[0].role, Role::User);
        assert_eq!(window.last().unwrap().content, "answer 14");
    }

    #[test]
    fn test_old_turns_are_retained() {
        let history = history_with_pairs(15);
        assert_eq!(history.len(), 30);
        assert_eq!(history.turns()[0].content, "question 0");
    }

    #[test]
    fn test_alternation_is_not_enforced() {
        let mut history = ConversationHistory::new();
        history.push(ConversationTurn::user("one"));
        history.push(ConversationTurn::user("two"));
        assert_eq!(history.len(), 2);
        assert!(history.turns().iter().all(|t| t.role == Role::User));
    }
}
