use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::ai_provider::{AIError, AnalysisProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    content: Vec<RawContent>,
    #[serde(default)]
    error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

/// Decoded body of a nominally successful messages call
#[derive(Debug, Clone, PartialEq)]
pub enum ClaudeReply {
    Success(String),
    ApiError { kind: String, message: String },
    Empty,
    Malformed(String),
}

impl ClaudeReply {
    pub fn decode(body: &str) -> Self {
        let raw: RawReply = match serde_json::from_str(body) {
            Ok(raw) => raw,
            Err(e) => return ClaudeReply::Malformed(e.to_string()),
        };

        if let Some(err) = raw.error {
            if !err.message.trim().is_empty() {
                return ClaudeReply::ApiError {
                    kind: err.kind,
                    message: err.message,
                };
            }
        }

        raw.content
            .into_iter()
            .find_map(|item| match item.text {
                Some(text) if item.kind == "text" && !text.trim().is_empty() => Some(text),
                _ => None,
            })
            .map(ClaudeReply::Success)
            .unwrap_or(ClaudeReply::Empty)
    }

    pub fn into_result(self) -> Result<String, AIError> {
        match self {
            ClaudeReply::Success(text) => Ok(text),
            ClaudeReply::ApiError { kind, message } => Err(AIError::Api { kind, message }),
            ClaudeReply::Empty => Err(AIError::EmptyResponse),
            ClaudeReply::Malformed(reason) => Err(AIError::ParseError(reason)),
        }
    }
}

/// Map a non-success HTTP status to its failure kind
fn status_error(status: StatusCode, body: String) -> AIError {
    match status.as_u16() {
        429 => AIError::RateLimited,
        401 => AIError::Unauthorized,
        400 => AIError::MalformedRequest(body),
        code => AIError::ServerError { status: code, body },
    }
}

pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    timeout: Duration,
}

impl ClaudeProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait::async_trait]
impl AnalysisProvider for ClaudeProvider {
    async fn send(&self, prompt: &str) -> Result<String, AIError> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            "Sending analysis request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Analysis request failed with HTTP {}: {}", status, body);
            return Err(status_error(status, body));
        }

        let body = response.text().await?;
        ClaudeReply::decode(&body).into_result()
    }

    fn provider_name(&self) -> &str {
        "claude"
    }
}
