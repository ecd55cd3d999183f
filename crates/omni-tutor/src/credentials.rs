//! API key resolution.
//!
//! The key is looked up on every turn: first in an environment variable,
//! then in a TOML secrets file holding a top-level entry of the same name:
//!
//! ```toml
//! OPENAI_API_KEY = "sk-..."
//! ```
//!
//! Empty or whitespace-only values count as absent. When neither source
//! yields a key the caller gets [`ConfigError::MissingCredential`] and no
//! request is sent.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::{DEFAULT_API_KEY_ENV, DEFAULT_SECRETS_PATH};

/// A resolved API key. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Where a key was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SecretsFile,
}

/// Resolves the API key from the environment, then the secrets file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialResolver {
    /// Environment variable (and secrets-file key) holding the API key.
    pub env_var: String,
    /// TOML secrets store consulted when the variable is unset.
    pub secrets_path: PathBuf,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_API_KEY_ENV.to_string(),
            secrets_path: PathBuf::from(DEFAULT_SECRETS_PATH),
        }
    }
}

impl CredentialResolver {
    pub fn new(env_var: impl Into<String>, secrets_path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            secrets_path: secrets_path.into(),
        }
    }

    /// Resolve the key, reporting which source supplied it.
    pub fn resolve_with_source(&self) -> Result<(ApiKey, CredentialSource), ConfigError> {
        if let Some(key) = std::env::var(&self.env_var).ok().and_then(non_blank) {
            debug!(env_var = %self.env_var, "API key resolved from environment");
            return Ok((ApiKey(key), CredentialSource::Environment));
        }

        if let Some(key) = read_secret(&self.secrets_path, &self.env_var)? {
            debug!(path = %self.secrets_path.display(), "API key resolved from secrets file");
            return Ok((ApiKey(key), CredentialSource::SecretsFile));
        }

        Err(ConfigError::MissingCredential {
            env_var: self.env_var.clone(),
            secrets_path: self.secrets_path.clone(),
        })
    }

    /// Resolve the key.
    pub fn resolve(&self) -> Result<ApiKey, ConfigError> {
        self.resolve_with_source().map(|(key, _)| key)
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Look `name` up in the secrets file. A missing file is not an error; an
/// unreadable or malformed one is.
fn read_secret(path: &Path, name: &str) -> Result<Option<String>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ConfigError::SecretsFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let table: toml::Table = text.parse().map_err(|e: toml::de::Error| ConfigError::SecretsFile {
        path: path.to_path_buf(),
        message: e.message().to_string(),
    })?;

    match table.get(name) {
        None => Ok(None),
        Some(toml::Value::String(value)) => Ok(non_blank(value.clone())),
        Some(other) => Err(ConfigError::SecretsFile {
            path: path.to_path_buf(),
            message: format!("{name} must be a string, found {}", other.type_str()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secrets(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    #[test]
    fn environment_wins_over_secrets_file() {
        let var = "OMNI_TUTOR_TEST_KEY_ENV_WINS";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "  sk-from-env  ") };
        let file = secrets(&format!("{var} = \"sk-from-file\""));

        let resolver = CredentialResolver::new(var, file.path());
        let (key, source) = resolver.resolve_with_source().unwrap();
        assert_eq!(key.expose(), "sk-from-env");
        assert_eq!(source, CredentialSource::Environment);

        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn falls_back_to_secrets_file() {
        let var = "OMNI_TUTOR_TEST_KEY_FALLBACK";
        let file = secrets(&format!("{var} = \"sk-from-file\"\nOTHER = 1\n"));

        let resolver = CredentialResolver::new(var, file.path());
        let (key, source) = resolver.resolve_with_source().unwrap();
        assert_eq!(key.expose(), "sk-from-file");
        assert_eq!(source, CredentialSource::SecretsFile);
    }

    #[test]
    fn blank_environment_value_is_absent() {
        let var = "OMNI_TUTOR_TEST_KEY_BLANK";
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var(var, "   ") };
        let dir = tempfile::tempdir().unwrap();

        let resolver = CredentialResolver::new(var, dir.path().join("secrets.toml"));
        let err = resolver.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));

        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn missing_everywhere_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = CredentialResolver::new(
            "OMNI_TUTOR_TEST_KEY_NEVER_SET",
            dir.path().join("absent.toml"),
        );
        assert_eq!(
            resolver.resolve().unwrap_err(),
            ConfigError::MissingCredential {
                env_var: "OMNI_TUTOR_TEST_KEY_NEVER_SET".into(),
                secrets_path: dir.path().join("absent.toml"),
            }
        );
    }

    #[test]
    fn malformed_secrets_file_is_reported() {
        let file = secrets("this is not = = toml");
        let resolver = CredentialResolver::new("OMNI_TUTOR_TEST_KEY_MALFORMED", file.path());
        assert!(matches!(
            resolver.resolve().unwrap_err(),
            ConfigError::SecretsFile { .. }
        ));
    }

    #[test]
    fn non_string_secret_is_reported() {
        let var = "OMNI_TUTOR_TEST_KEY_NUMBER";
        let file = secrets(&format!("{var} = 42"));
        let err = CredentialResolver::new(var, file.path()).resolve().unwrap_err();
        match err {
            ConfigError::SecretsFile { message, .. } => assert!(message.contains("integer")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret");
        assert_eq!(format!("{key:?}"), "ApiKey(****)");
    }
}
