//! Error types for the Jarvis domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them so binaries can propagate with `?`.

use thiserror::Error;

/// The top-level error type for all Jarvis operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Raw provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Model client errors (after retry classification) ---
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- I/O shim errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Agent session errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

// --- Bounded context errors ---

/// A single failed request to a model backend, before any retry decision.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether a later attempt of the same request may succeed.
    ///
    /// Rate limits, timeouts, dropped connections and server-side (5xx)
    /// failures are transient. Everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Whether this failure means no request can ever succeed with the
    /// current credentials or configuration.
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::ModelNotFound(_) | Self::NotConfigured(_)
        )
    }
}

/// What the language model client surfaces to the agent after applying
/// its retry policy.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// The retry budget is spent or the failure was not retryable.
    /// Fatal to the current turn only.
    #[error("Model unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable {
        attempts: u32,
        last_error: ProviderError,
    },

    /// Credentials or configuration are wrong. Fatal to the whole session.
    #[error("Fatal configuration error: {0}")]
    FatalConfiguration(String),
}

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool execution failed: {tool_name}: {cause}")]
    Execution { tool_name: String, cause: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Turn out of order: expected sequence index {expected}, got {found}")]
    Ordering { expected: u64, found: u64 },
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel connection lost: {0}")]
    ConnectionLost(String),

    #[error("Output delivery failed: {0}")]
    DeliveryFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("Input is empty or a termination command")]
    EmptyInput,

    #[error("Session ended by fatal configuration error: {0}")]
    FatalConfiguration(String),

    #[error("Session is no longer usable")]
    SessionClosed,

    #[error("Could not record turn: {0}")]
    Memory(#[from] MemoryError),
}
