use std::env;
use std::time::Duration;

use crate::client::DEFAULT_TIMEOUT_SECS;
use crate::error::Error;
use crate::transport::DEFAULT_BASE_URL;

/// Front-end configuration loaded from environment variables.
///
/// The library itself never reads the environment; front-ends build a
/// `Config` and hand its values to [`crate::GitHubClient::new`].
#[derive(Clone)]
pub struct Config {
    /// Personal access token
    pub token: String,
    /// REST API base URL
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("GITHUB_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("GITHUB_TOKEN"))?;

        let api_url = lookup("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs: u64 = lookup("GITHUB_TIMEOUT_SECS")
            .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("GITHUB_TIMEOUT_SECS"))?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("GITHUB_TIMEOUT_SECS"));
        }

        Ok(Self {
            token,
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Configuration(err.to_string())
    }
}
