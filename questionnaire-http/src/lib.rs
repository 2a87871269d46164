//! # questionnaire-http
//!
//! HTTP collaborators for the questionnaire engine.
//!
//! [`HttpBackend`] implements both `ScriptProvider` and `SubmissionSink`
//! against the questionnaire backend. Configure it with a [`BackendConfig`],
//! usually read from the environment:
//!
//! ```rust,ignore
//! let backend = HttpBackend::from_env()?;
//! let mut flow = Questionnaire::new(session_id, identity);
//! flow.load(&backend).await?;
//! ```

mod client;
pub use client::{
    HttpBackend, TIMEOUT_MESSAGE, UNREACHABLE_MESSAGE, describe_request_error, http_error_message,
};

mod config;
pub use config::{
    BASE_URL_VAR, BackendConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, TIMEOUT_VAR,
};
