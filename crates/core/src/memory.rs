//! Conversation view policies.
//!
//! The memory crate owns the history itself; this module defines how a
//! caller asks for a bounded slice of it when building a prompt.

use serde::{Deserialize, Serialize};

/// How much of the history to include in a prompt.
///
/// Every policy keeps the newest turns and drops from the oldest end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewPolicy {
    /// The full history.
    #[default]
    All,
    /// At most the last `n` turns.
    LastTurns(usize),
    /// The longest suffix whose estimated token total fits the budget.
    TokenBudget(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all() {
        assert_eq!(ViewPolicy::default(), ViewPolicy::All);
    }

    #[test]
    fn policy_serialization() {
        let json = serde_json::to_string(&ViewPolicy::LastTurns(20)).unwrap();
        assert_eq!(json, r#"{"last_turns":20}"#);
        let parsed: ViewPolicy = serde_json::from_str(r#"{"token_budget":512}"#).unwrap();
        assert_eq!(parsed, ViewPolicy::TokenBudget(512));
    }
}
