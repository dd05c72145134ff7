//! # Jarvis Core
//!
//! Domain types, traits, and error definitions for the Jarvis
//! conversational agent. Every subsystem is defined as a trait or value
//! type here; implementations live in their respective crates.
//!
//! - `turn`: conversation turns and session identity
//! - `provider`: the language model boundary
//! - `tool`: the tool boundary and the shared registry
//! - `channel`: the user I/O boundary

pub mod error;
pub mod turn;
pub mod provider;
pub mod channel;
pub mod tool;
pub mod memory;
pub mod agent;

// Re-export key types at crate root for ergonomics
pub use error::Error;
pub use turn::{Role, SessionId, Turn};
pub use provider::{ModelParameters, ModelRequest, PromptContext, PromptMessage, PromptRole, Provider, ToolDefinition};
pub use channel::{ConversationIo, TERMINATION_TOKENS, is_termination_token};
pub use tool::{FnTool, Tool, ToolRegistry};
pub use memory::ViewPolicy;
pub use agent::{AgentConfig, AgentState, SessionStatus};
