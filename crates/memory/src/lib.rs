//! Conversation memory for Jarvis.
//!
//! One [`ConversationMemory`] per session; nothing here is shared between
//! sessions or persisted past the end of one.

pub mod conversation;

pub use conversation::{ConversationMemory, HistoryView};
