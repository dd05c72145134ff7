//! Conversation memory: the ordered, append-only turn log of one session.
//!
//! Turns are only ever removed by [`ConversationMemory::trim`], which always
//! drops from the oldest end. Sequence indices keep counting across trims,
//! so a trimmed history never reuses an index.

use jarvis_core::error::MemoryError;
use jarvis_core::memory::ViewPolicy;
use jarvis_core::turn::{Role, Turn};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An ordered log of turns with strictly increasing sequence indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
    next_index: u64,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The sequence index the next appended turn must carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Append a turn at the end.
    ///
    /// Fails unless `turn.sequence_index` is exactly one past the current
    /// maximum (or zero for an empty, never-used history).
    pub fn append(&mut self, turn: Turn) -> Result<(), MemoryError> {
        if turn.sequence_index != self.next_index {
            return Err(MemoryError::Ordering {
                expected: self.next_index,
                found: turn.sequence_index,
            });
        }
        self.next_index += 1;
        self.turns.push(turn);
        Ok(())
    }

    /// Append a new turn with the next sequence index and return it.
    pub fn record(&mut self, role: Role, content: impl Into<String>) -> &Turn {
        let turn = Turn::new(role, content, self.next_index);
        self.next_index += 1;
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// A read-only window over the history selected by `policy`.
    pub fn view(&self, policy: ViewPolicy) -> HistoryView<'_> {
        let start = self.window_start(policy);
        HistoryView {
            turns: &self.turns[start..],
        }
    }

    /// Permanently drop every turn the policy would leave out of a view.
    ///
    /// Returns how many turns were removed.
    pub fn trim(&mut self, policy: ViewPolicy) -> usize {
        let start = self.window_start(policy);
        if start > 0 {
            self.turns.drain(..start);
            debug!(removed = start, remaining = self.turns.len(), "Trimmed conversation memory");
        }
        start
    }

    /// All retained turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Index of the first turn kept by `policy`.
    fn window_start(&self, policy: ViewPolicy) -> usize {
        match policy {
            ViewPolicy::All => 0,
            ViewPolicy::LastTurns(n) => self.turns.len().saturating_sub(n),
            ViewPolicy::TokenBudget(budget) => {
                let mut used = 0usize;
                let mut start = self.turns.len();
                for turn in self.turns.iter().rev() {
                    used += turn.estimated_tokens();
                    if used > budget {
                        break;
                    }
                    start -= 1;
                }
                start
            }
        }
    }
}

/// A borrowed, restartable window over a conversation history.
///
/// Iterating does not copy turns; calling [`HistoryView::iter`] again (or
/// cloning the view) starts over from the oldest turn in the window.
#[derive(Debug, Clone, Copy)]
pub struct HistoryView<'a> {
    turns: &'a [Turn],
}

impl<'a> HistoryView<'a> {
    pub fn iter(&self) -> std::slice::Iter<'a, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl<'a> IntoIterator for HistoryView<'a> {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &HistoryView<'a> {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_with(contents: &[&str]) -> ConversationMemory {
        let mut memory = ConversationMemory::new();
        for (i, c) in contents.iter().enumerate() {
            let role = if i % 2 == 0 { Role::User } else { Role::Agent };
            memory.record(role, *c);
        }
        memory
    }

    #[test]
    fn append_requires_next_index() {
        let mut memory = ConversationMemory::new();
        memory.append(Turn::user("hi", 0)).unwrap();
        memory.append(Turn::agent("hello", 1)).unwrap();

        let err = memory.append(Turn::user("skipped", 3)).unwrap_err();
        assert_eq!(err, MemoryError::Ordering { expected: 2, found: 3 });

        let err = memory.append(Turn::user("repeat", 1)).unwrap_err();
        assert_eq!(err, MemoryError::Ordering { expected: 2, found: 1 });

        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn first_turn_must_be_zero() {
        let mut memory = ConversationMemory::new();
        assert!(memory.append(Turn::user("hi", 1)).is_err());
        assert!(memory.is_empty());
    }

    #[test]
    fn record_assigns_increasing_indices() {
        let memory = memory_with(&["a", "b", "c"]);
        let indices: Vec<u64> = memory.turns().iter().map(|t| t.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(memory.next_index(), 3);
    }

    #[test]
    fn view_all_returns_everything_in_order() {
        let memory = memory_with(&["a", "b", "c"]);
        let contents: Vec<&str> = memory
            .view(ViewPolicy::All)
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn view_last_turns_keeps_newest() {
        let memory = memory_with(&["a", "b", "c", "d"]);
        let view = memory.view(ViewPolicy::LastTurns(2));
        let contents: Vec<&str> = view.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["c", "d"]);

        assert_eq!(memory.view(ViewPolicy::LastTurns(10)).len(), 4);
        assert!(memory.view(ViewPolicy::LastTurns(0)).is_empty());
    }

    #[test]
    fn view_token_budget_keeps_fitting_suffix() {
        // 8 chars = 2 tokens each
        let memory = memory_with(&["aaaaaaaa", "bbbbbbbb", "cccccccc"]);
        let view = memory.view(ViewPolicy::TokenBudget(5));
        let contents: Vec<&str> = view.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["bbbbbbbb", "cccccccc"]);

        // A budget smaller than the newest turn yields nothing rather than
        // skipping over it.
        assert!(memory.view(ViewPolicy::TokenBudget(1)).is_empty());
    }

    #[test]
    fn view_is_restartable_and_deterministic() {
        let memory = memory_with(&["a", "b", "c", "d", "e"]);
        let view = memory.view(ViewPolicy::LastTurns(3));
        let first: Vec<&Turn> = view.iter().collect();
        let second: Vec<&Turn> = view.iter().collect();
        assert_eq!(first, second);

        let again: Vec<&Turn> = memory.view(ViewPolicy::LastTurns(3)).into_iter().collect();
        assert_eq!(first, again);
    }

    #[test]
    fn views_are_ordered_subsequences_without_duplicates() {
        let memory = memory_with(&["one", "two", "three", "four", "five", "six", "seven"]);
        let policies = [
            ViewPolicy::All,
            ViewPolicy::LastTurns(0),
            ViewPolicy::LastTurns(3),
            ViewPolicy::LastTurns(100),
            ViewPolicy::TokenBudget(0),
            ViewPolicy::TokenBudget(3),
            ViewPolicy::TokenBudget(1000),
        ];

        for policy in policies {
            let view = memory.view(policy);
            let indices: Vec<u64> = view.iter().map(|t| t.sequence_index).collect();
            assert!(indices.windows(2).all(|w| w[0] < w[1]), "{policy:?} not ordered");
            for turn in &view {
                assert!(memory.turns().contains(turn), "{policy:?} invented a turn");
            }
        }
    }

    #[test]
    fn trim_drops_oldest_and_keeps_counting() {
        let mut memory = memory_with(&["a", "b", "c", "d"]);
        let removed = memory.trim(ViewPolicy::LastTurns(2));
        assert_eq!(removed, 2);
        assert_eq!(memory.turns()[0].content, "c");
        assert_eq!(memory.turns()[0].sequence_index, 2);

        // Indices continue after the trimmed tail.
        assert_eq!(memory.next_index(), 4);
        memory.append(Turn::user("e", 4)).unwrap();
        assert_eq!(memory.trim(ViewPolicy::All), 0);
        assert_eq!(memory.len(), 3);
    }

    #[test]
    fn memory_serializes_turns() {
        let memory = memory_with(&["hi", "hello"]);
        let json = serde_json::to_string(&memory).unwrap();
        let parsed: ConversationMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, memory);
    }
}
