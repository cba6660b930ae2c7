//! Completion endpoint client
//!
//! Transport outcomes are classified into [`ClientError`] here, once, so the
//! retry policy only ever matches on a closed set of variants.

use crate::{prompt::Prompt, secrets::Credential, Error, GeneratorConfig, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Request parameters for one attempt.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a Prompt,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Generated texts returned by the endpoint, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub choices: Vec<String>,
}

impl Completion {
    pub fn new(choices: Vec<String>) -> Self {
        Self { choices }
    }

    /// Trimmed text of the first choice, if it has any content.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Unexpected(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        credential: &Credential,
        request: &CompletionRequest<'_>,
    ) -> std::result::Result<Completion, ClientError>;
}

/// OpenAI-compatible chat completions over HTTPS.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    api_base: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        credential: &Credential,
        request: &CompletionRequest<'_>,
    ) -> std::result::Result<Completion, ClientError> {
        let body = ChatCompletionRequest {
            model: request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt.as_str(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Sending completion request (model: {})", request.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Remote(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Unexpected(format!("failed to parse response: {}", e)))?;

        Ok(body.into_completion())
    }
}

/// Map a non-success HTTP status and its body to the error taxonomy.
pub fn classify_status(status: StatusCode, body: &str) -> ClientError {
    let message = error_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited(message),
        _ => ClientError::Remote(format!("{}: {}", status.as_u16(), message)),
    }
}

fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    parsed.error.message.filter(|m| !m.is_empty())
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    fn into_completion(self) -> Completion {
        Completion::new(
            self.choices
                .into_iter()
                .filter_map(|choice| choice.message.and_then(|m| m.content))
                .collect(),
        )
    }
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}
