use async_trait::async_trait;

use crate::{
    FetchedScript, IdentitySnapshot, LinkError, LinkedAccount, ScriptLoadError, Submission,
    SubmissionError, SubmissionReceipt,
};

/// Fetches the step list for a questionnaire instance.
///
/// Providers are pure I/O. The engine owns structural checks, visibility and
/// resumption.
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    /// Fetch the script for `instance_id`.
    ///
    /// # Arguments
    /// * `instance_id` - The questionnaire instance (the backend's session id)
    /// * `respondent_email` - The identified respondent, used to look up
    ///   answers stored by an earlier, interrupted attempt
    async fn fetch_script(
        &self,
        instance_id: &str,
        respondent_email: Option<&str>,
    ) -> Result<FetchedScript, ScriptLoadError>;
}

/// Reports who the respondent is. Consulted once, before loading.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self) -> IdentitySnapshot;
}

/// Links an external account (wallet) to the respondent.
#[async_trait]
pub trait AccountLinker: Send + Sync {
    /// Ask the user to connect an account.
    ///
    /// Returns `Ok(None)` when the user cancels.
    async fn connect(&self) -> Result<Option<LinkedAccount>, LinkError>;

    /// Forget the connected account. Failures here are not surfaced.
    async fn disconnect(&self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// Receives the single submission of a completed questionnaire.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Deliver the submission. Called at most once per submit attempt; the
    /// sink must not retry on its own.
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmissionError>;
}
