//! Shared test helpers for session tests.

use jarvis_core::channel::ConversationIo;
use jarvis_core::error::{ChannelError, ProviderError};
use jarvis_core::provider::{ModelRequest, Provider};
use jarvis_core::tool::{FnTool, ToolRegistry};
use jarvis_providers::{LanguageModelClient, RetryPolicy};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A provider that replays scripted outcomes and records every request.
///
/// Once the script runs out it either repeats `fallback` or panics, so a
/// test that makes more calls than expected fails loudly.
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies with each text in order.
    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    /// Replies with `text` on every call.
    pub fn always(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Self::new(vec![])
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        if let Some(outcome) = self.outcomes.lock().unwrap().pop_front() {
            return outcome;
        }
        match &self.fallback {
            Some(text) => Ok(text.clone()),
            None => panic!("ScriptedProvider: no more responses (call #{call})"),
        }
    }
}

/// A provider that never answers within any reasonable time.
pub struct StalledProvider;

#[async_trait::async_trait]
impl Provider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn complete(&self, _request: ModelRequest) -> Result<String, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("Final Answer: too late".into())
    }
}

/// Wrap a provider in a client with short, deterministic backoff.
pub fn client(provider: Arc<dyn Provider>) -> Arc<LanguageModelClient> {
    Arc::new(
        LanguageModelClient::new(provider, "mock-model").with_retry_policy(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
            multiplier: 2.0,
            attempt_timeout: None,
        }),
    )
}

/// A `Search` tool that always observes `observation`.
pub fn search_tool(observation: &'static str) -> FnTool {
    FnTool::new(
        "Search",
        "Useful for searching the internet for current information.",
        move |_| Ok(observation.to_string()),
    )
}

/// A `Search` tool that always fails.
pub fn failing_search_tool() -> FnTool {
    FnTool::new(
        "Search",
        "Useful for searching the internet for current information.",
        |_| Err("connection refused".into()),
    )
}

pub fn registry_with(tool: FnTool) -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(tool)).unwrap();
    Arc::new(registry)
}

pub const WEATHER_CALL: &str =
    "Thought: Do I need to use a tool? Yes\nAction: Search\nAction Input: today's weather";

/// An I/O shim fed from a fixed list of inputs that records every output.
pub struct ScriptedIo {
    inputs: VecDeque<String>,
    pub outputs: Vec<String>,
}

impl ScriptedIo {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            outputs: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl ConversationIo for ScriptedIo {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn acquire_input(&mut self) -> Result<Option<String>, ChannelError> {
        Ok(self.inputs.pop_front())
    }

    async fn present_output(&mut self, text: &str) -> Result<(), ChannelError> {
        self.outputs.push(text.to_string());
        Ok(())
    }
}
