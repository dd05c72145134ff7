//! OpenAI-compatible provider implementation.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM and any endpoint exposing
//! `/v1/chat/completions`. Tools are described in the prompt text and
//! selected by the model through the `Action:` format, so requests carry
//! plain messages only.

use async_trait::async_trait;
use jarvis_core::error::ProviderError;
use jarvis_core::provider::{ModelRequest, PromptMessage, PromptRole, Provider};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Rate-limit wait assumed when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// An OpenAI-compatible chat completions provider.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    ///
    /// `request_timeout` bounds each HTTP exchange; an expired request
    /// surfaces as [`ProviderError::Timeout`].
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new("openai", "https://api.openai.com/v1", api_key, Duration::from_secs(120))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Convert prompt messages to OpenAI API format.
    fn to_api_messages(messages: &[PromptMessage]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    PromptRole::System => "system".into(),
                    PromptRole::User => "user".into(),
                    PromptRole::Assistant => "assistant".into(),
                },
                content: m.content.clone(),
            })
            .collect()
    }

    fn build_body(request: &ModelRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.context.messages),
            "temperature": request.parameters.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = request.parameters.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.parameters.stop.is_empty() {
            body["stop"] = serde_json::json!(request.parameters.stop);
        }

        body
    }

    /// Map a non-success HTTP status onto the provider error taxonomy.
    ///
    /// `retry_after` is the server's `Retry-After` hint in seconds, if any.
    fn status_error(status: u16, retry_after: Option<u64>, body: String, model: &str) -> ProviderError {
        match status {
            429 => ProviderError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            },
            401 | 403 => ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            404 => ProviderError::ModelNotFound(model.to_string()),
            408 | 504 => ProviderError::Timeout(format!("Gateway timeout (status {status})")),
            _ => ProviderError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    /// Delay-seconds form of `Retry-After`. The HTTP-date form is ignored.
    fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
        headers
            .get(RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    fn transport_error(err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }

    fn extract_text(response: ApiResponse) -> Result<String, ProviderError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::build_body(&request);

        debug!(provider = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status().as_u16();

        if status != 200 {
            let retry_after = Self::retry_after_secs(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, ?retry_after, body = %error_body, "Provider returned error");
            return Err(Self::status_error(status, retry_after, error_body, &request.model));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| ProviderError::ApiError {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        Self::extract_text(api_response)
    }
}

// --- OpenAI API wire types ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
