//! Documentation Generator Library
//!
//! Builds a prompt from a source file and its static-analysis summary, sends
//! it to a hosted completion endpoint and returns generated documentation,
//! retrying rate-limited requests with exponential backoff.

pub mod analysis;
pub mod cli;
pub mod client;
pub mod error;
pub mod generator;
pub mod prompt;
pub mod repository;
pub mod retry;
pub mod secrets;

pub use analysis::{AnalysisSummary, CodeAnalyzer};
pub use error::{Error, Result};
pub use generator::{DocumentGenerator, DocumentResult, FailureKind};
pub use repository::{open_repository, RepositoryHandle};

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Configuration for the documentation generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub api_base: String,
    pub request_timeout: Duration,
    pub verbose: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(60),
            verbose: false,
        }
    }
}

impl GeneratorConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check value ranges. Called by the generator before it resolves a credential.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::InvalidTemperature {
                temp: self.temperature,
            });
        }

        if self.max_tokens == 0 {
            return Err(Error::InvalidMaxTokens {
                tokens: self.max_tokens,
            });
        }

        if !(1..=10).contains(&self.max_attempts) {
            return Err(Error::InvalidMaxAttempts {
                attempts: self.max_attempts,
            });
        }

        Ok(())
    }
}
