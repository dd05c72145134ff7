//! I/O shim trait: how user input reaches the agent and replies go back.
//!
//! A console, a test script, or a speech pair can sit behind this trait.
//! Termination commands are recognised here, never by the agent.

use async_trait::async_trait;
use crate::error::ChannelError;

/// Inputs that end the conversation loop.
pub const TERMINATION_TOKENS: &[&str] = &["exit", "quit"];

/// Whether `input` is a request to end the conversation.
pub fn is_termination_token(input: &str) -> bool {
    let trimmed = input.trim();
    TERMINATION_TOKENS
        .iter()
        .any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// The boundary between a human and the agent loop.
#[async_trait]
pub trait ConversationIo: Send {
    /// A short name for logs (e.g., "console").
    fn name(&self) -> &str;

    /// Wait for the next user input. `Ok(None)` means the input source is
    /// exhausted (EOF) and the loop should end.
    async fn acquire_input(&mut self) -> Result<Option<String>, ChannelError>;

    /// Show a reply to the user.
    async fn present_output(&mut self, text: &str) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_tokens_are_case_insensitive() {
        assert!(is_termination_token("exit"));
        assert!(is_termination_token("  QUIT "));
        assert!(is_termination_token("Exit"));
        assert!(!is_termination_token("exit now"));
        assert!(!is_termination_token("what is 2+2"));
    }
}
