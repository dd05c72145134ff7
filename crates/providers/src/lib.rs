//! Language model access for Jarvis.
//!
//! [`LanguageModelClient`] is what the agent talks to; it applies retry
//! and backoff around a single [`Provider`](jarvis_core::Provider).
//! [`OpenAiCompatProvider`] is the HTTP backend used in production.

pub mod builder;
pub mod client;
pub mod openai_compat;

pub use builder::build_client;
pub use client::{LanguageModelClient, RetryPolicy};
pub use openai_compat::OpenAiCompatProvider;
