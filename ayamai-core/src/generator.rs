//! The text-generation seam.
//!
//! Dreaming and narration can ask an external model for prose through
//! [`TextGenerator`]. A degraded answer is a [`Generation::NoOutput`], not an
//! error, so callers can fall back to local remixing and keep going.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use textgen::{Gemini, Request};
use thiserror::Error;
use tracing::{debug, warn};

/// Outcome of one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The model produced text.
    Text(String),
    /// The model answered but without usable text.
    NoOutput { reason: String },
}

impl Generation {
    pub fn no_output(reason: impl Into<String>) -> Self {
        Generation::NoOutput {
            reason: reason.into(),
        }
    }

    /// The generated text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Generation::Text(text) => Some(text),
            Generation::NoOutput { .. } => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Generation::Text(text) => Some(text),
            Generation::NoOutput { .. } => None,
        }
    }
}

/// Errors that stop generation outright.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("Generator is not configured: {0}")]
    Configuration(String),

    #[error("Generator unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    #[error("Generator rejected the request: {0}")]
    Rejected(String),
}

/// Anything that can turn a prompt into prose.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate at most `max_tokens` tokens of text for `prompt`.
    async fn generate(&self, prompt: &str, max_tokens: usize)
        -> Result<Generation, GeneratorError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Fixed-delay retry for transient generator failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// Configuration errors are returned on the first attempt. Transient
    /// errors are retried; once attempts are exhausted the last one is
    /// reported as [`GeneratorError::Unavailable`].
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, GeneratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, textgen::Error>>,
    {
        let max = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "generation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if err.is_configuration() {
                return Err(GeneratorError::Configuration(err.to_string()));
            }
            if !err.is_transient() {
                return Err(GeneratorError::Rejected(err.to_string()));
            }
            if attempt >= max {
                warn!(attempts = attempt, error = %err, "generator retries exhausted");
                return Err(GeneratorError::Unavailable {
                    attempts: attempt,
                    last_error: err.to_string(),
                });
            }

            warn!(
                attempt,
                max_attempts = max,
                delay_ms = self.delay.as_millis() as u64,
                error = %err,
                "transient generator failure, retrying"
            );
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// [`TextGenerator`] backed by the Gemini API.
pub struct GeminiGenerator {
    client: Gemini,
    retry: RetryPolicy,
    temperature: Option<f32>,
}

impl GeminiGenerator {
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            temperature: None,
        }
    }

    /// Build from `GEMINI_API_KEY` / `GOOGLE_API_KEY` and friends.
    pub fn from_env() -> Result<Self, GeneratorError> {
        Gemini::from_env()
            .map(Self::new)
            .map_err(|e| GeneratorError::Configuration(e.to_string()))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        max_tokens: usize,
    ) -> Result<Generation, GeneratorError> {
        let mut request = Request::prompt(prompt).with_max_output_tokens(max_tokens);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        let client = &self.client;
        self.retry
            .run(|| {
                let request = request.clone();
                async move {
                    match client.complete(request).await {
                        Ok(response) => Ok(match response.text() {
                            Some(text) => Generation::Text(text),
                            None => Generation::no_output(response.missing_text_reason()),
                        }),
                        Err(textgen::Error::Parse(reason)) => {
                            Ok(Generation::no_output(format!("malformed response: {reason}")))
                        }
                        Err(err) => Err(err),
                    }
                }
            })
            .await
    }

    fn name(&self) -> &str {
        self.client.model()
    }
}
