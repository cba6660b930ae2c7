//! Documentation generation with rate-limit retries

use crate::{
    analysis::AnalysisSummary,
    client::{ClientError, CompletionClient, CompletionRequest, OpenAiClient},
    prompt::{build_prompt, Prompt},
    retry::RetryPolicy,
    secrets::{Credential, CredentialChain},
    GeneratorConfig, Result,
};
use log::{error, info, warn};
use std::fmt;

/// Why a documentation request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidCredential,
    RateLimited,
    EmptyResponse,
    RemoteError,
    Unexpected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidCredential => "invalid-credential",
            FailureKind::RateLimited => "rate-limited",
            FailureKind::EmptyResponse => "empty-response",
            FailureKind::RemoteError => "remote-error",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

/// Outcome of [`DocumentGenerator::generate_documentation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentResult {
    Success(String),
    Failure { kind: FailureKind, message: String },
}

impl DocumentResult {
    fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        DocumentResult::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DocumentResult::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            DocumentResult::Success(_) => None,
            DocumentResult::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Short text suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            DocumentResult::Success(text) => text.clone(),
            DocumentResult::Failure { kind, message } => match kind {
                FailureKind::InvalidCredential => {
                    "Invalid OpenAI API key. Please check your credentials.".to_string()
                }
                FailureKind::RateLimited => "Rate limit hit. Try again in a few minutes.".to_string(),
                FailureKind::EmptyResponse => "OpenAI returned no completion.".to_string(),
                FailureKind::RemoteError => format!("OpenAI error: {}", message),
                FailureKind::Unexpected => format!("Unexpected error: {}", message),
            },
        }
    }
}

impl fmt::Display for DocumentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

/// Sends prompts to a completion endpoint, retrying on rate limits.
///
/// The credential is resolved during construction; a generator without one
/// cannot exist.
pub struct DocumentGenerator<C = OpenAiClient> {
    config: GeneratorConfig,
    credential: Credential,
    policy: RetryPolicy,
    client: C,
}

impl DocumentGenerator<OpenAiClient> {
    pub fn new(config: GeneratorConfig, credentials: &CredentialChain) -> Result<Self> {
        config.validate()?;
        let credential = credentials.resolve()?;
        let client = OpenAiClient::new(&config)?;
        Ok(Self::assemble(config, credential, client))
    }
}

impl<C: CompletionClient> DocumentGenerator<C> {
    pub fn with_client(
        config: GeneratorConfig,
        credentials: &CredentialChain,
        client: C,
    ) -> Result<Self> {
        config.validate()?;
        let credential = credentials.resolve()?;
        Ok(Self::assemble(config, credential, client))
    }

    fn assemble(config: GeneratorConfig, credential: Credential, client: C) -> Self {
        let policy = RetryPolicy::from_config(&config);

        if config.verbose {
            info!(
                "Initialized documentation generator with model: {} ({} attempts, base delay {:?})",
                config.model_name, policy.max_attempts, policy.base_delay
            );
        }

        Self {
            config,
            credential,
            policy,
            client,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Generate documentation for `code`. Never fails: remote errors come back
    /// as [`DocumentResult::Failure`].
    ///
    /// The future must be awaited to completion. Dropping it mid-backoff
    /// abandons the request with no result.
    pub async fn generate_documentation(
        &self,
        code: &str,
        analysis: &AnalysisSummary,
    ) -> DocumentResult {
        let prompt = build_prompt(code, analysis);
        self.request(&prompt).await
    }

    async fn request(&self, prompt: &Prompt) -> DocumentResult {
        let request = CompletionRequest {
            model: &self.config.model_name,
            prompt,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut attempt = 0;
        loop {
            let outcome = self.client.complete(&self.credential, &request).await;

            match outcome {
                Ok(completion) => {
                    return match completion.first_text() {
                        Some(text) => {
                            info!("Documentation generated on attempt {}", attempt + 1);
                            DocumentResult::Success(text.to_string())
                        }
                        None => {
                            error!(
                                "Completion response had no usable choice ({} returned)",
                                completion.choices.len()
                            );
                            DocumentResult::failure(
                                FailureKind::EmptyResponse,
                                "response contained no completion",
                            )
                        }
                    };
                }
                Err(ClientError::Authentication(message)) => {
                    error!("Completion request rejected credentials: {}", message);
                    return DocumentResult::failure(FailureKind::InvalidCredential, message);
                }
                Err(ClientError::RateLimited(message)) => match self.policy.backoff(attempt) {
                    Some(delay) => {
                        warn!(
                            "Rate limited on attempt {}/{}: {}. Retrying in {:?}",
                            attempt + 1,
                            self.policy.max_attempts,
                            message,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        error!(
                            "Rate limited on final attempt {}/{}: {}",
                            attempt + 1,
                            self.policy.max_attempts,
                            message
                        );
                        return DocumentResult::failure(FailureKind::RateLimited, message);
                    }
                },
                Err(ClientError::Remote(message)) => {
                    error!("Completion request failed: {}", message);
                    return DocumentResult::failure(FailureKind::RemoteError, message);
                }
                Err(ClientError::Unexpected(message)) => {
                    error!("Unexpected failure during completion request: {}", message);
                    return DocumentResult::failure(FailureKind::Unexpected, message);
                }
            }
        }
    }
}
