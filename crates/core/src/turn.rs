//! Turn and session identity types.
//!
//! A [`Turn`] is the atomic unit of conversation history: one user input,
//! one agent reply, or one tool observation. Turns are immutable value
//! objects; ordering is carried by `sequence_index`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an agent session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant's final reply
    Agent,
    /// A tool observation (success output or failure description)
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Agent => "agent",
            Role::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// A single entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub sequence_index: u64,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, sequence_index: u64) -> Self {
        Self {
            role,
            content: content.into(),
            sequence_index,
        }
    }

    pub fn user(content: impl Into<String>, sequence_index: u64) -> Self {
        Self::new(Role::User, content, sequence_index)
    }

    pub fn agent(content: impl Into<String>, sequence_index: u64) -> Self {
        Self::new(Role::Agent, content, sequence_index)
    }

    pub fn tool(content: impl Into<String>, sequence_index: u64) -> Self {
        Self::new(Role::Tool, content, sequence_index)
    }

    /// Rough token estimate (4 chars ≈ 1 token), rounded up.
    pub fn estimated_tokens(&self) -> usize {
        self.content.len().div_ceil(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_role() {
        assert_eq!(Turn::user("hi", 0).role, Role::User);
        assert_eq!(Turn::agent("hello", 1).role, Role::Agent);
        assert_eq!(Turn::tool("sunny", 2).role, Role::Tool);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Turn::agent("4", 3)).unwrap();
        assert!(json.contains("\"agent\""));
        assert!(json.contains("\"sequence_index\":3"));
    }

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(Turn::user("12345678", 0).estimated_tokens(), 2);
        assert_eq!(Turn::user("123456789", 0).estimated_tokens(), 3);
        assert_eq!(Turn::user("", 0).estimated_tokens(), 0);
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
