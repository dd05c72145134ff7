//! Agent configuration and session state types.

use serde::{Deserialize, Serialize};
use crate::memory::ViewPolicy;
use crate::provider::ModelParameters;

/// Per-session configuration for the agent controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool cycles per turn (safety limit)
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Sampling parameters passed to the model on every call
    #[serde(default)]
    pub model_parameters: ModelParameters,

    /// How much history goes into each prompt
    #[serde(default)]
    pub history: ViewPolicy,

    /// Trim memory to this window after every committed turn
    #[serde(default)]
    pub retention: Option<ViewPolicy>,
}

fn default_max_iterations() -> u32 {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            model_parameters: ModelParameters::default(),
            history: ViewPolicy::default(),
            retention: None,
        }
    }
}

/// Where the controller is inside a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    Init,
    Thinking,
    ToolCall,
    Observing,
    Final,
    Done,
    Error,
}

/// Whether a session can still take turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    /// A fatal configuration error ended the session.
    Failed { reason: String },
}
