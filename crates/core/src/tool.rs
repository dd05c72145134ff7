//! Tool trait: the abstraction over agent capabilities.
//!
//! A tool takes one text argument and produces text or a failure. Tools are
//! registered once at startup in a [`ToolRegistry`], which is then shared
//! read-only (behind an `Arc`) by every session.

use async_trait::async_trait;
use futures::FutureExt;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The core Tool trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "Search"). Lookup is exact-match.
    fn name(&self) -> &str;

    /// A description of what this tool does (shown to the model).
    fn description(&self) -> &str;

    /// Run the tool on a single text input.
    async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for the prompt.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}

type ToolFn = dyn Fn(&str) -> std::result::Result<String, String> + Send + Sync;

/// A tool built from a plain closure.
///
/// Handy for wiring small synchronous capabilities without a dedicated type.
pub struct FnTool {
    name: String,
    description: String,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError> {
        (self.func)(input).map_err(|cause| ToolError::Execution {
            tool_name: self.name.clone(),
            cause,
        })
    }
}

/// A registry of available tools.
///
/// Registration order is preserved so prompts list tools deterministically.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name already exists.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        debug!(tool = %name, "Registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Get a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Get all tool definitions, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// Returns `UnknownTool` if the name is absent. Every failure raised by
    /// the tool itself, panics included, comes back as `ToolError::Execution`
    /// carrying the tool name.
    pub async fn invoke(&self, name: &str, input: &str) -> std::result::Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let outcome = AssertUnwindSafe(tool.invoke(input)).catch_unwind().await;

        match outcome {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(err)) => {
                warn!(tool = %name, error = %err, "Tool failed");
                Err(into_execution_error(name, err))
            }
            Err(panic) => {
                let cause = panic_message(panic.as_ref());
                warn!(tool = %name, cause = %cause, "Tool panicked");
                Err(ToolError::Execution {
                    tool_name: name.to_string(),
                    cause: format!("tool panicked: {cause}"),
                })
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn into_execution_error(name: &str, err: ToolError) -> ToolError {
    match err {
        ToolError::Execution { .. } => err,
        other => ToolError::Execution {
            tool_name: name.to_string(),
            cause: other.to_string(),
        },
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &str { "boom" }
        fn description(&self) -> &str { "Always panics" }
        async fn invoke(&self, _input: &str) -> std::result::Result<String, ToolError> {
            panic!("kaboom")
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("Echo").is_none());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        let err = registry.register(Arc::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateTool(ref n) if n == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn definitions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(FnTool::new("zeta", "last letter", |s| Ok(s.into()))))
            .unwrap();
        registry.register(Arc::new(EchoTool)).unwrap();
        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["zeta", "echo"]);
    }

    #[tokio::test]
    async fn invoke_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        let output = registry.invoke("echo", "hello world").await.unwrap();
        assert_eq!(output, "hello world");
    }

    #[tokio::test]
    async fn invoke_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("nonexistent", "x").await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn tool_failure_becomes_execution_error() {
        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(FnTool::new("flaky", "always fails", |_| {
                Err("upstream down".into())
            })))
            .unwrap();
        let err = registry.invoke("flaky", "x").await.unwrap_err();
        match err {
            ToolError::Execution { tool_name, cause } => {
                assert_eq!(tool_name, "flaky");
                assert_eq!(cause, "upstream down");
            }
            other => panic!("expected Execution, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_input_is_wrapped_with_tool_name() {
        struct Picky;

        #[async_trait]
        impl Tool for Picky {
            fn name(&self) -> &str { "picky" }
            fn description(&self) -> &str { "rejects everything" }
            async fn invoke(&self, _input: &str) -> std::result::Result<String, ToolError> {
                Err(ToolError::InvalidInput("empty query".into()))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Picky)).unwrap();
        let err = registry.invoke("picky", "").await.unwrap_err();
        assert!(matches!(err, ToolError::Execution { ref tool_name, ref cause }
            if tool_name == "picky" && cause.contains("empty query")));
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(PanickingTool)).unwrap();
        let err = registry.invoke("boom", "x").await.unwrap_err();
        match err {
            ToolError::Execution { tool_name, cause } => {
                assert_eq!(tool_name, "boom");
                assert!(cause.contains("kaboom"));
            }
            other => panic!("expected Execution, got {other:?}"),
        }
    }
}
