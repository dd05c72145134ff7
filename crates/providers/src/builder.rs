//! Builds the language model client from configuration.

use crate::client::{LanguageModelClient, RetryPolicy};
use crate::openai_compat::OpenAiCompatProvider;
use jarvis_config::{AppConfig, RetrySettings};
use jarvis_core::error::ModelError;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            attempt_timeout: Some(Duration::from_secs(settings.request_timeout_secs)),
            ..RetryPolicy::default()
        }
    }
}

/// Build the client for the configured endpoint.
///
/// Missing credentials are a startup-time failure, reported before any
/// session exists.
pub fn build_client(config: &AppConfig) -> Result<LanguageModelClient, ModelError> {
    let api_key = config
        .require_api_key()
        .map_err(|e| ModelError::FatalConfiguration(e.to_string()))?;

    let provider = OpenAiCompatProvider::new(
        &config.provider,
        &config.api_url,
        api_key,
        Duration::from_secs(config.retry.request_timeout_secs),
    )
    .map_err(|e| ModelError::FatalConfiguration(e.to_string()))?;

    info!(provider = %config.provider, model = %config.model, "Language model client ready");

    Ok(LanguageModelClient::new(Arc::new(provider), &config.model)
        .with_retry_policy(RetryPolicy::from(&config.retry)))
}
