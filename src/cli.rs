//! Command line interface for the documentation generator

use crate::{
    secrets::{CredentialChain, DEFAULT_API_KEY_VAR, DEFAULT_SECRETS_FILE},
    GeneratorConfig, Result, DEFAULT_API_BASE, DEFAULT_MODEL,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Generate technical documentation for a source file using an LLM
#[derive(Parser, Debug)]
#[command(name = "generate-docs")]
#[command(about = "Generate technical documentation for source files with an LLM")]
#[command(version)]
#[command(long_about = r#"
Generate technical documentation for source files with an LLM

The file is analyzed for functions, classes and imports, combined with its
source into a prompt and sent to an OpenAI-compatible completion endpoint.
Rate-limited requests are retried with exponential backoff.

The API key is read from the secrets file first, then from the environment.

Examples:
  generate-docs app.py                         # Print documentation for app.py
  generate-docs app.py --output docs/app.md    # Write it to a file
  generate-docs app.py --analysis app.json     # Use an external analysis summary
  generate-docs app.py --max-attempts 5        # Allow more rate-limit retries
"#)]
pub struct Cli {
    /// Source file to document, relative to the repository
    pub file: PathBuf,

    /// Git repository containing the file
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// JSON analysis summary to use instead of analyzing the file
    #[arg(long)]
    pub analysis: Option<PathBuf>,

    /// Write documentation to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Model identifier sent to the endpoint
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Sampling temperature (0.0-2.0)
    #[arg(long, default_value = "0.7")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[arg(long, default_value = "1024")]
    pub max_tokens: u32,

    /// Total attempts when rate limited (1-10)
    #[arg(long, default_value = "3")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for each further retry
    #[arg(long, default_value = "2")]
    pub base_delay_secs: u64,

    /// Base URL of the completion API
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// TOML file holding OPENAI_API_KEY
    #[arg(long, default_value = DEFAULT_SECRETS_FILE)]
    pub secrets_file: PathBuf,

    /// Environment variable holding the API key
    #[arg(long, default_value = DEFAULT_API_KEY_VAR)]
    pub api_key_env: String,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate command line arguments
    pub fn validate(&self) -> Result<()> {
        self.to_config().validate()
    }

    /// Convert CLI arguments to GeneratorConfig
    pub fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig::default()
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_secs(self.base_delay_secs))
            .with_api_base(&self.api_base)
            .with_verbose(self.verbose)
    }

    pub fn credential_chain(&self) -> CredentialChain {
        CredentialChain::standard(&self.secrets_file, &self.api_key_env)
    }

    /// The source file, resolved against the repository path.
    pub fn source_path(&self) -> PathBuf {
        self.repo.join(&self.file)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            repo: PathBuf::from("."),
            analysis: None,
            output: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            max_attempts: 3,
            base_delay_secs: 2,
            api_base: DEFAULT_API_BASE.to_string(),
            secrets_file: PathBuf::from(DEFAULT_SECRETS_FILE),
            api_key_env: DEFAULT_API_KEY_VAR.to_string(),
            verbose: false,
        }
    }
}
