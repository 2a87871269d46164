/// Error type for fetching a script. Fatal to the questionnaire instance.
#[derive(Debug, thiserror::Error)]
pub enum ScriptLoadError {
    /// The backend could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not complete in time.
    #[error("Request timed out. Is the backend running?")]
    Timeout,

    /// No questionnaire exists for the instance id.
    #[error("Questionnaire not found: {0}")]
    NotFound(String),

    /// The response could not be understood or describes an impossible script.
    #[error("Malformed script: {0}")]
    Malformed(String),

    /// Any other provider failure.
    #[error("Script provider error: {0}")]
    Transport(#[from] anyhow::Error),
}

impl ScriptLoadError {
    /// Create a transport error from any error type.
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }
}

/// Error type for submitting answers. Recoverable: the respondent may retry.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    /// The backend answered but did not accept the submission.
    #[error("Submission was not accepted: {0}")]
    Rejected(String),

    /// The request failed with a human-readable reason.
    #[error("{0}")]
    Failed(String),

    /// Any other sink failure.
    #[error("Submission error: {0}")]
    Transport(#[from] anyhow::Error),
}

impl SubmissionError {
    /// Create a transport error from any error type.
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }
}

/// Error type for linking an external account.
///
/// The user closing the link dialog is not an error; linkers report that as
/// `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Wallet connection failed: {0}")]
    Failed(String),

    #[error("Linker error: {0}")]
    Backend(#[from] anyhow::Error),
}
