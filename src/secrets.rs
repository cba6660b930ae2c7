//! API credential resolution from an ordered list of sources

use crate::{Error, Result};
use log::debug;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// The secret authorizing calls to the completion endpoint.
///
/// Resolved once when a generator is built and owned by it afterwards. The
/// value is never printed, not even through `Debug`.
pub struct Credential(SecretString);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

/// One place a credential may live.
pub trait CredentialSource: Send + Sync {
    /// Human readable location, used in logs and error messages.
    fn describe(&self) -> String;

    /// `Ok(None)` means the source has no value. Errors are reserved for
    /// sources that exist but cannot be read.
    fn resolve(&self) -> Result<Option<String>>;
}

/// A TOML secrets file holding the key at top level, e.g. `OPENAI_API_KEY = "sk-..."`.
pub struct SecretsFile {
    path: PathBuf,
    key: String,
}

impl SecretsFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl CredentialSource for SecretsFile {
    fn describe(&self) -> String {
        format!("secrets file {} (key {})", self.path.display(), self.key)
    }

    fn resolve(&self) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::configuration(format!(
                    "Cannot read secrets file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let table: toml::Table = toml::from_str(&content).map_err(|source| Error::SecretsFile {
            path: self.path.clone(),
            source,
        })?;

        match table.get(&self.key) {
            None => Ok(None),
            Some(toml::Value::String(value)) => Ok(Some(value.clone())),
            Some(_) => Err(Error::configuration(format!(
                "{} in {} must be a string",
                self.key,
                self.path.display()
            ))),
        }
    }
}

/// An environment variable. Empty values count as unset.
pub struct EnvVar {
    name: String,
}

impl EnvVar {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CredentialSource for EnvVar {
    fn describe(&self) -> String {
        format!("environment variable {}", self.name)
    }

    fn resolve(&self) -> Result<Option<String>> {
        Ok(std::env::var(&self.name).ok())
    }
}

/// Adapter so plain closures can take part in a chain.
pub struct FnSource<F> {
    name: String,
    resolve: F,
}

impl<F> CredentialSource for FnSource<F>
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn resolve(&self) -> Result<Option<String>> {
        Ok((self.resolve)())
    }
}

/// Sources tried in order; the first non-empty value wins.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Secrets file first, then the environment variable.
    pub fn standard(secrets_file: impl Into<PathBuf>, env_var: impl Into<String>) -> Self {
        Self::new()
            .with_source(SecretsFile::new(secrets_file, DEFAULT_API_KEY_VAR))
            .with_source(EnvVar::new(env_var))
    }

    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn with_fn<F>(self, name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        self.with_source(FnSource {
            name: name.into(),
            resolve,
        })
    }

    pub fn resolve(&self) -> Result<Credential> {
        for source in &self.sources {
            let value = source.resolve()?;
            match value.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => {
                    debug!("Using API credential from {}", source.describe());
                    return Ok(Credential::new(value));
                }
                _ => debug!("No API credential in {}", source.describe()),
            }
        }

        let tried = self
            .sources
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(", ");

        Err(Error::configuration(if tried.is_empty() {
            "Missing OpenAI API key: no credential sources configured".to_string()
        } else {
            format!("Missing OpenAI API key. Looked in: {}", tried)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_non_empty_source_wins() {
        let chain = CredentialChain::new()
            .with_fn("empty", || Some("   ".to_string()))
            .with_fn("missing", || None)
            .with_fn("first", || Some("sk-first".to_string()))
            .with_fn("second", || Some("sk-second".to_string()));

        let credential = chain.resolve().unwrap();
        assert_eq!(credential.expose(), "sk-first");
    }

    #[test]
    fn test_no_credential_is_configuration_error() {
        let chain = CredentialChain::new().with_fn("missing", || None);
        let err = chain.resolve().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("missing"));

        let err = CredentialChain::new().resolve().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_secrets_file_takes_priority_over_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secrets.toml");
        std::fs::write(&path, "OPENAI_API_KEY = \"sk-from-file\"\n").unwrap();

        std::env::set_var("DOCGEN_TEST_PRIORITY_KEY", "sk-from-env");
        let chain = CredentialChain::standard(&path, "DOCGEN_TEST_PRIORITY_KEY");
        let credential = chain.resolve().unwrap();
        std::env::remove_var("DOCGEN_TEST_PRIORITY_KEY");

        assert_eq!(credential.expose(), "sk-from-file");
    }

    #[test]
    fn test_missing_secrets_file_falls_back_to_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.toml");

        std::env::set_var("DOCGEN_TEST_FALLBACK_KEY", "sk-from-env");
        let chain = CredentialChain::standard(&path, "DOCGEN_TEST_FALLBACK_KEY");
        let credential = chain.resolve().unwrap();
        std::env::remove_var("DOCGEN_TEST_FALLBACK_KEY");

        assert_eq!(credential.expose(), "sk-from-env");
    }

    #[test]
    fn test_malformed_secrets_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secrets.toml");
        std::fs::write(&path, "OPENAI_API_KEY = [unterminated").unwrap();

        let result = SecretsFile::new(&path, DEFAULT_API_KEY_VAR).resolve();
        assert!(matches!(result, Err(Error::SecretsFile { .. })));

        std::fs::write(&path, "OPENAI_API_KEY = 42\n").unwrap();
        let result = SecretsFile::new(&path, DEFAULT_API_KEY_VAR).resolve();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_unreadable_secrets_file_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();

        // A directory where the file should be
        let chain = CredentialChain::standard(temp_dir.path(), "DOCGEN_TEST_UNREADABLE_KEY");
        let err = chain.resolve().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.is_configuration());

        let path = temp_dir.path().join("secrets.toml");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let result = SecretsFile::new(&path, DEFAULT_API_KEY_VAR).resolve();
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }

    #[test]
    fn test_debug_does_not_leak() {
        let credential = Credential::new("sk-secret-value");
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("sk-secret-value"));
    }
}
