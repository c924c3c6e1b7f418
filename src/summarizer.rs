//! LLM summarizer over an OpenAI-compatible chat-completions API.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Fixed instruction sent as the system message
pub const SYSTEM_PROMPT: &str = "You are a concise summarizer. Given the text content of a webpage, \
produce a clear, bullet-pointed summary capturing the key points. \
Keep it under 300 words.";

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("authentication failed ({status}): {message}")]
    Unauthorized { status: StatusCode, message: String },
    #[error("quota or rate limit exceeded: {0}")]
    QuotaExceeded(String),
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("LLM request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
    #[error("API returned no completion")]
    EmptyResponse,
}

/// Everything needed to call the API, resolved up front
#[derive(Clone)]
pub struct SummarizerSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl fmt::Debug for SummarizerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<u64>,
    #[serde(default)]
    completion_tokens: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for a single chat-completions endpoint
#[derive(Debug)]
pub struct Summarizer {
    client: Client,
    settings: SummarizerSettings,
}

impl Summarizer {
    pub fn new(settings: SummarizerSettings) -> Result<Self, SummarizeError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(SummarizeError::ClientBuild)?;
        Ok(Self { client, settings })
    }

    /// Ask the model for a bullet-point summary of `text` taken from `url`
    pub async fn summarize(&self, text: &str, url: &str) -> Result<String, SummarizeError> {
        let user_prompt = user_prompt(text, url);
        let request = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.settings.max_tokens,
        };

        let endpoint = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );
        debug!(%endpoint, model = %self.settings.model, "requesting completion");

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(SummarizeError::Network)?;

        let status = response.status();
        let body = response.text().await.map_err(SummarizeError::Network)?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| SummarizeError::MalformedResponse(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            info!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "completion received"
            );
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(SummarizeError::EmptyResponse)
    }
}

fn user_prompt(text: &str, url: &str) -> String {
    format!("Summarize this page ({}):\n\n{}", url, text)
}

/// Map a non-2xx response onto an error kind
fn status_error(status: StatusCode, body: &str) -> SummarizeError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SummarizeError::Unauthorized { status, message }
        }
        StatusCode::TOO_MANY_REQUESTS => SummarizeError::QuotaExceeded(message),
        _ => SummarizeError::Api { status, message },
    }
}
