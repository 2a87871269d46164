//! In-memory collaborators for driving a questionnaire without a backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use questionnaire::{Questionnaire, IdentitySnapshot, Script, Step};
//! use questionnaire::testing::{RecordingSink, StaticScriptProvider};
//!
//! let provider = StaticScriptProvider::new(Script::new(vec![
//!     Step::free_text("p1", "Tell us about yourself"),
//! ]));
//! let sink = RecordingSink::new();
//!
//! let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::anonymous());
//! flow.load(&provider).await?;
//! flow.set_answer("p1", "hi")?;
//! flow.submit(&sink).await?;
//!
//! assert_eq!(sink.submissions().len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{
    AccountLinker, Answers, FetchedScript, IdentityProvider, IdentitySnapshot, LinkError,
    LinkedAccount, Script, ScriptLoadError, ScriptProvider, Submission, SubmissionError,
    SubmissionReceipt, SubmissionSink,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a [`StaticScriptProvider`] answers with.
#[derive(Debug, Clone)]
enum ScriptOutcome {
    Found(FetchedScript),
    NotFound,
    Unreachable,
}

/// A script provider serving one fixed script.
#[derive(Debug)]
pub struct StaticScriptProvider {
    outcome: ScriptOutcome,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticScriptProvider {
    /// Serve `script` with nothing to resume.
    pub fn new(script: Script) -> Self {
        Self::with_outcome(ScriptOutcome::Found(FetchedScript::new(script)))
    }

    /// Serve `script` together with answers from an earlier attempt.
    pub fn resuming(script: Script, prior: Answers) -> Self {
        Self::with_outcome(ScriptOutcome::Found(
            FetchedScript::new(script).with_prior_answers(prior),
        ))
    }

    /// Report that no questionnaire exists.
    pub fn not_found() -> Self {
        Self::with_outcome(ScriptOutcome::NotFound)
    }

    /// Fail as if the backend could not be reached.
    pub fn unreachable() -> Self {
        Self::with_outcome(ScriptOutcome::Unreachable)
    }

    fn with_outcome(outcome: ScriptOutcome) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every `(instance_id, respondent_email)` fetched so far.
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ScriptProvider for StaticScriptProvider {
    async fn fetch_script(
        &self,
        instance_id: &str,
        respondent_email: Option<&str>,
    ) -> Result<FetchedScript, ScriptLoadError> {
        lock(&self.requests).push((instance_id.to_string(), respondent_email.map(str::to_string)));
        match &self.outcome {
            ScriptOutcome::Found(fetched) => Ok(fetched.clone()),
            ScriptOutcome::NotFound => Err(ScriptLoadError::NotFound(instance_id.to_string())),
            ScriptOutcome::Unreachable => Err(ScriptLoadError::Network(
                "could not reach backend".to_string(),
            )),
        }
    }
}

/// How a [`RecordingSink`] answers one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    Accept,
    /// Answer with `accepted: false`.
    Reject,
    /// Fail with the given reason.
    Fail(String),
}

/// A submission sink that keeps everything it receives.
///
/// Outcomes queued with [`then`](RecordingSink::then) are used in order;
/// once they run out every submission is accepted.
#[derive(Debug, Default)]
pub struct RecordingSink {
    outcomes: Mutex<VecDeque<SinkOutcome>>,
    submissions: Mutex<Vec<Submission>>,
}

impl RecordingSink {
    /// A sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome for the next unanswered submission.
    pub fn then(self, outcome: SinkOutcome) -> Self {
        lock(&self.outcomes).push_back(outcome);
        self
    }

    /// Every submission received, including failed ones.
    pub fn submissions(&self) -> Vec<Submission> {
        lock(&self.submissions).clone()
    }

    pub fn calls(&self) -> usize {
        lock(&self.submissions).len()
    }

    /// The most recent submission.
    pub fn last(&self) -> Option<Submission> {
        lock(&self.submissions).last().cloned()
    }
}

#[async_trait]
impl SubmissionSink for RecordingSink {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmissionError> {
        lock(&self.submissions).push(submission.clone());
        let outcome = lock(&self.outcomes)
            .pop_front()
            .unwrap_or(SinkOutcome::Accept);
        match outcome {
            SinkOutcome::Accept => Ok(SubmissionReceipt::accepted()),
            SinkOutcome::Reject => Ok(SubmissionReceipt {
                accepted: false,
                hashes: None,
            }),
            SinkOutcome::Fail(reason) => Err(SubmissionError::Failed(reason)),
        }
    }
}

/// An account linker with a canned answer.
#[derive(Debug)]
pub struct StubLinker {
    result: Result<Option<LinkedAccount>, String>,
    disconnects: Mutex<usize>,
}

impl StubLinker {
    /// Always connect `account`.
    pub fn connecting(account: LinkedAccount) -> Self {
        Self::with_result(Ok(Some(account)))
    }

    /// The respondent always closes the dialog.
    pub fn cancelled() -> Self {
        Self::with_result(Ok(None))
    }

    /// Always fail with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_result(Err(reason.into()))
    }

    fn with_result(result: Result<Option<LinkedAccount>, String>) -> Self {
        Self {
            result,
            disconnects: Mutex::new(0),
        }
    }

    pub fn disconnects(&self) -> usize {
        *lock(&self.disconnects)
    }
}

#[async_trait]
impl AccountLinker for StubLinker {
    async fn connect(&self) -> Result<Option<LinkedAccount>, LinkError> {
        self.result.clone().map_err(LinkError::Failed)
    }

    async fn disconnect(&self) -> Result<(), LinkError> {
        *lock(&self.disconnects) += 1;
        Ok(())
    }
}

/// An identity provider that always reports the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct FixedIdentity(pub IdentitySnapshot);

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn resolve(&self) -> IdentitySnapshot {
        self.0.clone()
    }
}
