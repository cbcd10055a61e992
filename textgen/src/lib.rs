//! Minimal Gemini text-generation API client.
//!
//! This crate provides a focused client for the `generateContent` endpoint with:
//! - Single-shot `generateContent` completions
//! - Failure classification so callers can decide what to retry
//! - Tolerant response parsing that reports *why* no text came back

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether retrying the same request later could succeed.
    ///
    /// Connection failures, rate limiting and server-side errors are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether this error means the client itself is misconfigured.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::NoApiKey | Error::Config(_))
            || matches!(self, Error::Api { status, .. } if *status == 401 || *status == 403)
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
    timeout: Duration,
}

impl Gemini {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a client from the environment.
    ///
    /// Reads `GEMINI_API_KEY` (falling back to `GOOGLE_API_KEY`), and the
    /// optional `AYAMAI_MODEL` and `AYAMAI_API_BASE` overrides.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| Error::NoApiKey)?;
        if api_key.trim().is_empty() {
            return Err(Error::NoApiKey);
        }

        let mut client = Self::new(api_key);
        if let Ok(model) = std::env::var("AYAMAI_MODEL") {
            client = client.with_model(model);
        }
        if let Ok(base) = std::env::var("AYAMAI_API_BASE") {
            client = client.with_api_base(base);
        }
        Ok(client)
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point the client at a different API root (proxies, test servers).
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The model used when a request does not name one.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a completion request and return the full response.
    pub async fn complete(&self, request: Request) -> Result<Response, Error> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = self.endpoint(model);
        let api_request = build_api_request(&request);
        let headers = self.build_headers()?;

        debug!(%model, "sending generateContent request");

        let response = self
            .client
            .post(url)
            .headers(headers)
            .timeout(self.timeout)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(parse_response(api_response))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.api_base)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        if self.api_key.is_empty() {
            return Err(Error::NoApiKey);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

fn build_api_request(request: &Request) -> ApiRequest {
    let contents = request
        .messages
        .iter()
        .map(|m| ApiContent {
            role: Some(
                match m.role {
                    Role::User => "user",
                    Role::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![ApiPart {
                text: Some(m.text.clone()),
            }],
        })
        .collect();

    ApiRequest {
        contents,
        system_instruction: request.system.as_ref().map(|s| ApiContent {
            role: None,
            parts: vec![ApiPart {
                text: Some(s.clone()),
            }],
        }),
        generation_config: ApiGenerationConfig {
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
            top_k: request.top_k,
        },
    }
}

fn parse_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" => FinishReason::Safety,
        "RECITATION" => FinishReason::Recitation,
        _ => FinishReason::Other,
    }
}

fn parse_response(api_response: ApiResponse) -> Response {
    let candidates = api_response
        .candidates
        .into_iter()
        .map(|c| {
            let (role, parts) = match c.content {
                Some(content) => (
                    content.role,
                    content.parts.into_iter().filter_map(|p| p.text).collect(),
                ),
                None => (None, Vec::new()),
            };
            Candidate {
                role,
                parts,
                finish_reason: c.finish_reason.as_deref().map(parse_finish_reason),
            }
        })
        .collect();

    Response {
        model_version: api_response.model_version,
        candidates,
        prompt_feedback: api_response.prompt_feedback.map(|f| f.to_string()),
        usage: api_response
            .usage_metadata
            .map(|u| Usage {
                prompt_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default(),
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A completion request.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub max_output_tokens: usize,
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
}

impl Request {
    /// Create a new request with the given messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: None,
            max_output_tokens: 500,
            system: None,
            messages,
            temperature: None,
            top_k: None,
        }
    }

    /// Create a single-turn request from a prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(vec![Message::user(text)])
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: usize) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create a model message.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct Response {
    pub model_version: Option<String>,
    pub candidates: Vec<Candidate>,
    /// Raw prompt feedback, present when the prompt itself was blocked.
    pub prompt_feedback: Option<String>,
    pub usage: Usage,
}

impl Response {
    /// Text of the first candidate, if it produced any.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        if candidate.parts.is_empty() {
            return None;
        }
        Some(candidate.parts.join(""))
    }

    /// Explain why [`Response::text`] returned `None`.
    pub fn missing_text_reason(&self) -> String {
        if let Some(candidate) = self.candidates.first() {
            if candidate.parts.is_empty() && candidate.role.is_some() {
                return "model returned only a role, no text".to_string();
            }
            if let Some(reason) = candidate.finish_reason {
                return format!("candidate finished without text ({reason:?})");
            }
        }
        if let Some(feedback) = &self.prompt_feedback {
            return format!("prompt feedback: {feedback}");
        }
        "unrecognized response shape".to_string()
    }
}

/// One generated candidate.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub role: Option<String>,
    pub parts: Vec<String>,
    pub finish_reason: Option<FinishReason>,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub output_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

// Every field is optional: odd shapes still deserialize and are classified later.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}
