//! User I/O shims for Jarvis.
//!
//! Each shim implements [`ConversationIo`](jarvis_core::ConversationIo) and
//! sits between a person and the agent loop.
//!
//! Available shims:
//! - **Console**: interactive terminal chat (stdin/stdout)

pub mod console;

pub use console::ConsoleIo;
