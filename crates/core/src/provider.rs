//! Provider trait: the abstraction over language model backends.
//!
//! A Provider knows how to send one prompt to a model and get raw text back.
//! It performs exactly one attempt; retry and backoff live in the
//! `LanguageModelClient` that wraps it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;

/// The role of a message inside a model prompt.
///
/// This is the provider-facing vocabulary; conversation turns are mapped
/// onto it when a prompt is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// One role/content pair in a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: PromptRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: PromptRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: PromptRole::Assistant, content: content.into() }
    }
}

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
}

/// Sampling parameters for a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stop sequences
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
}

fn default_temperature() -> f32 {
    0.6
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: None,
            stop: Vec::new(),
        }
    }
}

/// Everything the controller hands to the model for one completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    /// Ordered role/content pairs
    pub messages: Vec<PromptMessage>,

    /// Tools the model may name in its output
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// A single request to a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// The model to use (e.g., "gpt-4-turbo-preview")
    pub model: String,

    #[serde(flatten)]
    pub context: PromptContext,

    pub parameters: ModelParameters,
}

/// The core Provider trait.
///
/// Every backend (OpenAI-compatible HTTP, scripted test fakes) implements
/// this. The agent never talks to a provider directly.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a request and return the model's raw text output.
    async fn complete(&self, request: ModelRequest) -> std::result::Result<String, ProviderError>;
}
