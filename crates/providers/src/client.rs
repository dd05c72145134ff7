//! Language model client: bounded retry with exponential backoff.
//!
//! Wraps a single [`Provider`] and turns its raw per-attempt failures into
//! the two outcomes the agent cares about:
//!
//! - [`ModelError::Unavailable`]: transient failures outlived the retry
//!   budget, or the request was rejected in a way retrying cannot fix.
//!   Fatal to the current turn only.
//! - [`ModelError::FatalConfiguration`]: credentials or model id are wrong.
//!   Never retried; fatal to the whole session.

use jarvis_core::error::{ModelError, ProviderError};
use jarvis_core::provider::{ModelParameters, ModelRequest, PromptContext, Provider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Retry and timeout settings for model calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Growth factor per consecutive failure.
    pub multiplier: f64,
    /// Per-attempt deadline. `None` leaves timeouts to the provider.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            multiplier: 2.0,
            attempt_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retrying after the `failures`-th consecutive failure.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1) as i32;
        let millis = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64).max(0.0);
        Duration::from_millis(capped.round() as u64)
    }

    /// Like [`delay_for`](Self::delay_for) but never shorter than what a
    /// rate-limited provider asked for (still capped at `max_delay`).
    fn delay_after(&self, failures: u32, error: &ProviderError) -> Duration {
        let backoff = self.delay_for(failures);
        match error {
            ProviderError::RateLimited { retry_after_secs } => backoff
                .max(Duration::from_secs(*retry_after_secs))
                .min(self.max_delay),
            _ => backoff,
        }
    }
}

/// The stateless request/response boundary the agent talks to.
pub struct LanguageModelClient {
    provider: Arc<dyn Provider>,
    model: String,
    policy: RetryPolicy,
}

impl LanguageModelClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            policy: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send the prompt and return the model's raw text.
    pub async fn complete(
        &self,
        context: &PromptContext,
        parameters: &ModelParameters,
    ) -> Result<String, ModelError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let request = ModelRequest {
                model: self.model.clone(),
                context: context.clone(),
                parameters: parameters.clone(),
            };

            debug!(
                provider = %self.provider.name(),
                model = %self.model,
                attempt,
                max_attempts,
                messages = context.messages.len(),
                "Sending model request"
            );

            let error = match self.attempt(request).await {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            if error.is_fatal_configuration() {
                error!(provider = %self.provider.name(), error = %error, "Model configuration is unusable");
                return Err(ModelError::FatalConfiguration(error.to_string()));
            }

            if !error.is_transient() {
                warn!(provider = %self.provider.name(), error = %error, "Model request rejected, not retrying");
                return Err(ModelError::Unavailable {
                    attempts: attempt,
                    last_error: error,
                });
            }

            if attempt >= max_attempts {
                warn!(
                    provider = %self.provider.name(),
                    attempts = attempt,
                    error = %error,
                    "Model retry budget exhausted"
                );
                return Err(ModelError::Unavailable {
                    attempts: attempt,
                    last_error: error,
                });
            }

            let delay = self.policy.delay_after(attempt, &error);
            warn!(
                provider = %self.provider.name(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient model failure, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn attempt(&self, request: ModelRequest) -> Result<String, ProviderError> {
        match self.policy.attempt_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.provider.complete(request)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(format!(
                    "Provider '{}' timed out after {}ms",
                    self.provider.name(),
                    limit.as_millis()
                ))),
            },
            None => self.provider.complete(request).await,
        }
    }
}
