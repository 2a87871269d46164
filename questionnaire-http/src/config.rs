use std::time::Duration;

/// Where the backend lives when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// How long a single request may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Environment variable overriding the backend URL.
pub const BASE_URL_VAR: &str = "QUESTIONNAIRE_BACKEND_URL";

/// Environment variable overriding the request timeout, in whole seconds.
pub const TIMEOUT_VAR: &str = "QUESTIONNAIRE_TIMEOUT_SECS";

/// Error type for backend configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("Could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings for the questionnaire backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl BackendConfig {
    /// Point at `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read [`BASE_URL_VAR`] and [`TIMEOUT_VAR`], falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_VAR) {
            let url = trim_base_url(url);
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    name: BASE_URL_VAR,
                    reason: format!("'{url}' is not an http(s) URL"),
                });
            }
            config.base_url = url;
        }

        if let Some(secs) = lookup(TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: TIMEOUT_VAR,
                reason: format!("'{secs}' is not a whole number of seconds"),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    name: TIMEOUT_VAR,
                    reason: "timeout must be at least one second".to_string(),
                });
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
