//! Built-in tool implementations for Jarvis.
//!
//! Tools give the agent information it cannot produce from the model
//! alone. The registry is built once at startup and shared read-only by
//! every session.

pub mod search;

use jarvis_config::SearchConfig;
use jarvis_core::error::ToolError;
use jarvis_core::tool::ToolRegistry;
use std::sync::Arc;

pub use search::SearchTool;

/// Create the default tool registry with all enabled built-in tools.
///
/// Registration errors are configuration errors and should stop startup.
pub fn default_registry(search: &SearchConfig) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    if search.enabled {
        registry.register(Arc::new(SearchTool::new(search)?))?;
    }
    Ok(registry)
}
