use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::error::{HfError, Result};

/// Key used both in the secrets file and as the environment variable name.
pub const TOKEN_KEY: &str = "HF_TOKEN";

/// Default secrets file probed before the environment.
pub const DEFAULT_SECRETS_FILE: &str = "secrets.toml";

/// An opaque bearer token. Resolved once at startup and read-only afterwards;
/// if it expires mid-session, calls fail and the process must be restarted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

/// Resolves the bearer token from a prioritized list of sources: the secrets
/// file first, then the process environment. The file wins so a deployed
/// instance can override whatever is in a developer's shell.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    secrets_file: PathBuf,
    env_var: String,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        CredentialResolver {
            secrets_file: PathBuf::from(DEFAULT_SECRETS_FILE),
            env_var: TOKEN_KEY.to_string(),
        }
    }
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secrets_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.secrets_file = path.into();
        self
    }

    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    /// Returns the first non-empty token found, or [`HfError::MissingCredential`].
    pub fn resolve(&self) -> Result<Credential> {
        if let Some(token) = self.from_secrets_file() {
            log::debug!("token loaded from {}", self.secrets_file.display());
            return Ok(Credential::new(token));
        }

        if let Some(token) = env::var(&self.env_var).ok().filter(|v| !v.is_empty()) {
            log::debug!("token loaded from ${}", self.env_var);
            return Ok(Credential::new(token));
        }

        Err(HfError::MissingCredential)
    }

    fn from_secrets_file(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.secrets_file).ok()?;
        let table: toml::Table = raw.parse().ok()?;
        table
            .get(TOKEN_KEY)
            .and_then(|value| value.as_str())
            .filter(|v| !v.is_empty())
            .map(String::from)
    }
}
