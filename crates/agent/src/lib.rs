//! The agent decision loop: the heart of Jarvis.
//!
//! Each user turn follows a **Think → Act → Observe** cycle:
//!
//! 1. **Receive** the user's input
//! 2. **Build a prompt** (system prompt + conversation history + scratchpad)
//! 3. **Ask the model** via the [`LanguageModelClient`](jarvis_providers::LanguageModelClient)
//! 4. **If a tool is requested**: run it, record the observation, go to 2
//! 5. **If an answer is given**: record it and return it to the caller
//!
//! The cycle ends when the model answers or the iteration budget runs out.

pub mod conversation;
pub mod decision;
pub mod prompt;
pub mod session;

#[cfg(test)]
mod test_helpers;

pub use conversation::{ConversationEnd, GOODBYE, run_conversation};
pub use decision::{AgentDecision, ParseFailure, parse_decision};
pub use prompt::ScratchEntry;
pub use session::{AgentController, AgentSession, TurnKind, TurnOutcome, APOLOGY, ITERATION_FALLBACK};
