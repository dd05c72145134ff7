//! The outer conversation loop: read input, run a turn, show the answer.

use crate::session::AgentController;
use jarvis_core::channel::{ConversationIo, is_termination_token};
use jarvis_core::error::{AgentError, Error};
use tracing::info;

/// Said when the user ends the conversation.
pub const GOODBYE: &str = "Goodbye! Have a great day.";

/// Why a conversation ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationEnd {
    /// The user typed a termination word.
    UserExit,
    /// The input source was exhausted.
    InputClosed,
}

/// Drive `controller` from `io` until the user leaves or the session dies.
///
/// Model outages are shown as an apology and the loop goes on. A fatal
/// configuration error, or a broken I/O shim, ends the loop with an error.
pub async fn run_conversation<I>(controller: &mut AgentController, io: &mut I) -> Result<ConversationEnd, Error>
where
    I: ConversationIo + ?Sized,
{
    loop {
        let Some(input) = io.acquire_input().await? else {
            info!(session = %controller.session().id, "Input closed, ending conversation");
            return Ok(ConversationEnd::InputClosed);
        };

        if is_termination_token(&input) {
            io.present_output(GOODBYE).await?;
            info!(session = %controller.session().id, "User ended conversation");
            return Ok(ConversationEnd::UserExit);
        }

        match controller.run_turn(&input).await {
            Ok(outcome) => io.present_output(&outcome.answer).await?,
            Err(AgentError::EmptyInput) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}
