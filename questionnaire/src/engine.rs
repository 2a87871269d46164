use std::collections::HashMap;
use std::fmt;

use questionnaire_types::{
    AccountLinker, AnswerKey, AnswerValue, Answers, FetchedScript, IdentityProvider,
    IdentitySnapshot, LinkError, LinkedAccount, PROVIDER_SUFFIX, Script, ScriptLoadError,
    ScriptProvider, Step, StepKind, Submission, SubmissionError, SubmissionReceipt,
    SubmissionSink,
};
use tracing::{debug, info, warn};

use crate::validation::{self, ValidationError};
use crate::{resume, respondent, submission, visibility};

/// Where a questionnaire instance is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Waiting for the script.
    Loading,
    /// The respondent is answering.
    Active,
    /// The submission is in flight.
    Submitting,
    /// The answers were accepted.
    Done,
    /// The script could not be loaded. The caller has to start over.
    Error(String),
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Submitting => "submitting",
            Self::Done => "done",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(cause) => write!(f, "error: {cause}"),
            other => f.write_str(other.name()),
        }
    }
}

/// Error type for questionnaire actions.
///
/// An action that fails never changes the position or the answers, with one
/// exception: a failed submission returns the flow to [`FlowState::Active`].
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Cannot {action} while the questionnaire is {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No step in this questionnaire stores an answer at '{0}'")]
    UnknownKey(AnswerKey),

    #[error("A {0} step cannot be skipped")]
    NotSkippable(&'static str),

    #[error("This is the last step; submit instead")]
    AtLastStep,

    #[error("Answers can only be submitted from the last step")]
    NotAtLastStep,

    #[error("The current step does not link an account")]
    NotALinkStep,

    #[error("The questionnaire was torn down")]
    TornDown,

    #[error(transparent)]
    Load(#[from] ScriptLoadError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Issued by [`Questionnaire::begin_load`]; required to apply the fetched script.
#[derive(Debug)]
#[must_use = "a load ticket must be passed to finish_load"]
pub struct LoadTicket {
    epoch: u64,
    instance_id: String,
    respondent_email: Option<String>,
}

impl LoadTicket {
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn respondent_email(&self) -> Option<&str> {
        self.respondent_email.as_deref()
    }
}

/// Issued when a submission starts; carries the payload to deliver.
#[derive(Debug)]
#[must_use = "a submit ticket must be passed to finish_submit"]
pub struct SubmitTicket {
    epoch: u64,
    submission: Submission,
}

impl SubmitTicket {
    pub fn submission(&self) -> &Submission {
        &self.submission
    }
}

/// The outcome of applying an asynchronous result.
#[derive(Debug)]
pub enum Settled<T> {
    /// The result was applied to the questionnaire.
    Applied(T),
    /// The ticket was stale (the questionnaire was torn down or moved on);
    /// nothing changed.
    Discarded,
}

/// What a freshly loaded questionnaire asks for.
#[derive(Debug)]
pub enum Started {
    /// Present the step at `position`.
    Ready { position: usize },
    /// No step is visible; the empty answers go straight to submission.
    NothingToAsk(SubmitTicket),
}

/// 1-based progress through the visible steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}", self.current, self.total)
    }
}

/// One respondent's run through one questionnaire instance.
///
/// All state lives here and is only changed through the methods below.
/// Loading and submitting are split into a `begin_*` call that hands out a
/// ticket and a `finish_*` call that applies the collaborator's result, so a
/// caller can await the collaborator however it likes. [`teardown`] makes
/// every outstanding ticket stale.
///
/// [`teardown`]: Questionnaire::teardown
#[derive(Debug)]
pub struct Questionnaire {
    instance_id: String,
    identity: IdentitySnapshot,
    script: Script,
    /// Answer key -> index of the script step that produces it.
    owners: HashMap<AnswerKey, usize>,
    /// Indices into `script.steps`, in display order.
    visible: Vec<usize>,
    position: usize,
    answers: Answers,
    state: FlowState,
    message: Option<String>,
    epoch: u64,
    torn_down: bool,
}

impl Questionnaire {
    /// Create a questionnaire for `instance_id`, waiting to load.
    pub fn new(instance_id: impl Into<String>, identity: IdentitySnapshot) -> Self {
        Self {
            instance_id: instance_id.into(),
            identity,
            script: Script::default(),
            owners: HashMap::new(),
            visible: Vec::new(),
            position: 0,
            answers: Answers::new(),
            state: FlowState::Loading,
            message: None,
            epoch: 0,
            torn_down: false,
        }
    }

    /// Create a questionnaire, asking `identity` who the respondent is.
    pub async fn for_respondent(
        instance_id: impl Into<String>,
        identity: &dyn IdentityProvider,
    ) -> Self {
        Self::new(instance_id, identity.resolve().await)
    }

    // === Accessors ===

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn identity(&self) -> &IdentitySnapshot {
        &self.identity
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// The message to show beside the current step, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Index into the visible sequence.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The step the respondent is looking at.
    pub fn current_step(&self) -> Option<&Step> {
        self.visible
            .get(self.position)
            .and_then(|&index| self.script.steps.get(index))
    }

    /// The visible sequence, in order.
    pub fn visible_steps(&self) -> Vec<&Step> {
        self.visible
            .iter()
            .filter_map(|&index| self.script.steps.get(index))
            .collect()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: if self.visible.is_empty() { 0 } else { self.position + 1 },
            total: self.visible.len(),
        }
    }

    /// Whether the respondent is on the last visible step.
    pub fn is_last_step(&self) -> bool {
        self.position + 1 >= self.visible.len()
    }

    /// Share of the visible required steps that are answered, in percent.
    pub fn completion_percentage(&self) -> u8 {
        resume::completion_percentage(&self.visible_steps(), &self.answers)
    }

    // === Loading ===

    /// Start loading the script. A second call supersedes the first ticket.
    pub fn begin_load(&mut self) -> Result<LoadTicket, FlowError> {
        self.ensure_state("load", |state| matches!(state, FlowState::Loading))?;
        self.epoch += 1;
        debug!(instance = %self.instance_id, "loading script");
        Ok(LoadTicket {
            epoch: self.epoch,
            instance_id: self.instance_id.clone(),
            respondent_email: self.identity.email().map(str::to_string),
        })
    }

    /// Apply the result of fetching the script.
    ///
    /// A fresh run starts at the first step. When the backend returns prior
    /// answers they are restored verbatim and the position is set to the
    /// first unanswered required step. A script that fails to load, or fails
    /// its structural check, puts the questionnaire in [`FlowState::Error`].
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<FetchedScript, ScriptLoadError>,
    ) -> Result<Settled<Started>, FlowError> {
        if self.is_stale(ticket.epoch) || self.state != FlowState::Loading {
            debug!(instance = %self.instance_id, "discarding stale script");
            return Ok(Settled::Discarded);
        }

        let fetched = match result.and_then(|fetched| {
            fetched.script.check()?;
            Ok(fetched)
        }) {
            Ok(fetched) => fetched,
            Err(err) => {
                warn!(instance = %self.instance_id, error = %err, "failed to load script");
                self.state = FlowState::Error(err.to_string());
                return Err(err.into());
            }
        };

        self.install(fetched);

        if self.visible.is_empty() {
            info!(instance = %self.instance_id, "script has no visible steps, submitting");
            self.state = FlowState::Submitting;
            return Ok(Settled::Applied(Started::NothingToAsk(
                self.issue_submit_ticket(),
            )));
        }

        self.state = FlowState::Active;
        info!(
            instance = %self.instance_id,
            steps = self.visible.len(),
            restored = self.answers.len(),
            position = self.position,
            "script loaded"
        );
        Ok(Settled::Applied(Started::Ready {
            position: self.position,
        }))
    }

    /// Fetch the script from `provider` and apply it.
    pub async fn load(&mut self, provider: &dyn ScriptProvider) -> Result<Started, FlowError> {
        let ticket = self.begin_load()?;
        let result = provider
            .fetch_script(ticket.instance_id(), ticket.respondent_email())
            .await;
        match self.finish_load(ticket, result)? {
            Settled::Applied(started) => Ok(started),
            Settled::Discarded => Err(FlowError::TornDown),
        }
    }

    /// Load the script and, when there is nothing to ask, submit right away.
    ///
    /// Returns the state the questionnaire ended up in.
    pub async fn start(
        &mut self,
        provider: &dyn ScriptProvider,
        sink: &dyn SubmissionSink,
    ) -> Result<FlowState, FlowError> {
        if let Started::NothingToAsk(ticket) = self.load(provider).await? {
            self.deliver(ticket, sink).await?;
        }
        Ok(self.state.clone())
    }

    fn install(&mut self, fetched: FetchedScript) {
        self.script = fetched.script;
        self.owners = self
            .script
            .steps
            .iter()
            .enumerate()
            .flat_map(|(index, step)| step.answer_keys().into_iter().map(move |key| (key, index)))
            .collect();
        let resuming = fetched
            .prior_answers
            .as_ref()
            .is_some_and(|prior| !prior.is_empty());
        self.answers = fetched.prior_answers.unwrap_or_default();
        self.visible =
            visibility::visible_indices(&self.script.steps, &self.identity, &self.answers);
        self.position = if resuming {
            resume::resume_position(&self.visible_steps(), &self.answers)
        } else {
            0
        };
        self.message = None;
    }

    // === Navigation ===

    /// Validate the current step and move to the next one.
    ///
    /// On failure the message is kept for display and the position stays.
    pub fn next(&mut self) -> Result<usize, FlowError> {
        self.ensure_state("go to the next step", |state| {
            matches!(state, FlowState::Active)
        })?;
        if self.is_last_step() {
            return Err(FlowError::AtLastStep);
        }
        let Some(step) = self.current_step() else {
            return Err(FlowError::AtLastStep);
        };
        let kind = step.kind_name();

        if let Err(err) = validation::can_advance(step, &self.answers) {
            debug!(instance = %self.instance_id, position = self.position, kind, reason = %err, "step blocked");
            self.message = Some(err.message.clone());
            return Err(err.into());
        }

        self.message = None;
        self.position += 1;
        debug!(instance = %self.instance_id, position = self.position, "advanced");
        Ok(self.position)
    }

    /// Go back one step. Never validates.
    pub fn back(&mut self) -> Result<usize, FlowError> {
        self.ensure_state("go back", |state| matches!(state, FlowState::Active))?;
        self.position = self.position.saturating_sub(1);
        self.message = None;
        debug!(instance = %self.instance_id, position = self.position, "went back");
        Ok(self.position)
    }

    /// Move past an account link or identity gate without answering it.
    pub fn skip(&mut self) -> Result<usize, FlowError> {
        self.ensure_state("skip", |state| matches!(state, FlowState::Active))?;
        let Some(step) = self.current_step() else {
            return Err(FlowError::AtLastStep);
        };
        if !step.is_skippable() {
            return Err(FlowError::NotSkippable(step.kind_name()));
        }
        if self.is_last_step() {
            return Err(FlowError::AtLastStep);
        }
        self.position += 1;
        self.message = None;
        debug!(instance = %self.instance_id, position = self.position, "skipped");
        Ok(self.position)
    }

    // === Answers ===

    /// Store `value` at `key`.
    ///
    /// Blank text removes the answer. Ratings of a multi-rate block are
    /// clamped into range, and dropped when they are not numbers. Changing an
    /// answer another step's visibility depends on re-derives the visible
    /// sequence.
    pub fn set_answer(
        &mut self,
        key: impl Into<AnswerKey>,
        value: impl Into<AnswerValue>,
    ) -> Result<(), FlowError> {
        self.ensure_state("edit answers", |state| matches!(state, FlowState::Active))?;
        let key = key.into();
        let owner = self.owner_of(&key)?;
        let value = value.into();

        if !value.is_filled() {
            self.answers.remove(&key);
        } else if let Some(value) = validation::normalize(&self.script.steps[owner], &key, value)
        {
            self.answers.insert(key.clone(), value);
        } else {
            debug!(instance = %self.instance_id, %key, "ignoring rating that is not a number");
            return Ok(());
        }

        self.message = None;
        self.after_edit(&key);
        Ok(())
    }

    /// Remove the answer at `key`.
    pub fn clear_answer(&mut self, key: impl Into<AnswerKey>) -> Result<(), FlowError> {
        self.ensure_state("edit answers", |state| matches!(state, FlowState::Active))?;
        let key = key.into();
        self.owner_of(&key)?;
        if self.answers.remove(&key).is_some() {
            self.after_edit(&key);
        }
        Ok(())
    }

    // === Account linking ===

    /// Record a linked account on the current link step.
    ///
    /// A later link replaces the earlier one.
    pub fn record_link(&mut self, account: LinkedAccount) -> Result<(), FlowError> {
        self.ensure_state("link an account", |state| {
            matches!(state, FlowState::Active)
        })?;
        let key = self.current_link_key()?;
        debug!(
            instance = %self.instance_id,
            %key,
            provider = %account.provider_tag,
            "account linked"
        );
        self.answers.insert(key.suffixed(PROVIDER_SUFFIX), account.provider_tag);
        self.answers.insert(key, account.identifier);
        self.message = None;
        Ok(())
    }

    /// Forget the account linked on the current link step.
    pub fn forget_link(&mut self) -> Result<(), FlowError> {
        self.ensure_state("unlink an account", |state| {
            matches!(state, FlowState::Active)
        })?;
        let key = self.current_link_key()?;
        self.answers.remove(&key.suffixed(PROVIDER_SUFFIX));
        self.answers.remove(&key);
        debug!(instance = %self.instance_id, %key, "account unlinked");
        Ok(())
    }

    /// Ask `linker` for an account and record it.
    ///
    /// Returns `Ok(None)` when the respondent cancelled; nothing changes then.
    pub async fn link_account(
        &mut self,
        linker: &dyn AccountLinker,
    ) -> Result<Option<LinkedAccount>, FlowError> {
        self.ensure_state("link an account", |state| {
            matches!(state, FlowState::Active)
        })?;
        self.current_link_key()?;

        match linker.connect().await {
            Ok(Some(account)) => {
                self.record_link(account.clone())?;
                Ok(Some(account))
            }
            Ok(None) => {
                debug!(instance = %self.instance_id, "account link cancelled");
                Ok(None)
            }
            Err(err) => {
                warn!(instance = %self.instance_id, error = %err, "account link failed");
                self.message = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Disconnect through `linker` and forget the account. A failing
    /// disconnect is logged and the account is forgotten anyway.
    pub async fn unlink_account(&mut self, linker: &dyn AccountLinker) -> Result<(), FlowError> {
        self.ensure_state("unlink an account", |state| {
            matches!(state, FlowState::Active)
        })?;
        self.current_link_key()?;
        if let Err(err) = linker.disconnect().await {
            warn!(instance = %self.instance_id, error = %err, "account disconnect failed");
        }
        self.forget_link()
    }

    // === Identity ===

    /// Replace the identity snapshot, e.g. after the respondent signed in.
    ///
    /// Identity gates leave the visible sequence for an identified
    /// respondent. The respondent stays on the same step, or moves to the
    /// next visible one when that step was hidden.
    pub fn update_identity(&mut self, identity: IdentitySnapshot) -> Result<(), FlowError> {
        self.ensure_state("update the identity", |state| {
            matches!(state, FlowState::Loading | FlowState::Active)
        })?;
        let changed = self.identity.signed_in != identity.signed_in;
        self.identity = identity;
        if changed && self.state == FlowState::Active {
            debug!(instance = %self.instance_id, signed_in = self.identity.signed_in, "identity changed");
            self.refresh_visibility();
        }
        Ok(())
    }

    // === Submission ===

    /// Validate the last step and package the answers for submission.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, FlowError> {
        self.ensure_state("submit", |state| matches!(state, FlowState::Active))?;
        if !self.is_last_step() {
            return Err(FlowError::NotAtLastStep);
        }
        if let Some(step) = self.current_step()
            && let Err(err) = validation::can_advance(step, &self.answers)
        {
            self.message = Some(err.message.clone());
            return Err(err.into());
        }

        self.state = FlowState::Submitting;
        self.message = None;
        debug!(instance = %self.instance_id, "submitting");
        Ok(self.issue_submit_ticket())
    }

    /// Apply the sink's answer to a submission.
    ///
    /// An accepted submission finishes the questionnaire and discards the
    /// answers. Anything else returns to the last step with the answers kept
    /// and the failure as the message.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<SubmissionReceipt, SubmissionError>,
    ) -> Result<Settled<SubmissionReceipt>, FlowError> {
        if self.is_stale(ticket.epoch) || self.state != FlowState::Submitting {
            debug!(instance = %self.instance_id, "discarding stale submission result");
            return Ok(Settled::Discarded);
        }

        match result.and_then(submission::require_accepted) {
            Ok(receipt) => {
                info!(instance = %self.instance_id, "submission accepted");
                self.state = FlowState::Done;
                self.answers = Answers::new();
                self.message = None;
                Ok(Settled::Applied(receipt))
            }
            Err(err) => {
                warn!(instance = %self.instance_id, error = %err, "submission failed");
                self.state = FlowState::Active;
                self.message = Some(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Submit the answers to `sink`.
    pub async fn submit(&mut self, sink: &dyn SubmissionSink) -> Result<SubmissionReceipt, FlowError> {
        let ticket = self.begin_submit()?;
        self.deliver(ticket, sink).await
    }

    async fn deliver(
        &mut self,
        ticket: SubmitTicket,
        sink: &dyn SubmissionSink,
    ) -> Result<SubmissionReceipt, FlowError> {
        let result = submission::deliver(sink, ticket.submission()).await;
        match self.finish_submit(ticket, result)? {
            Settled::Applied(receipt) => Ok(receipt),
            Settled::Discarded => Err(FlowError::TornDown),
        }
    }

    fn issue_submit_ticket(&mut self) -> SubmitTicket {
        self.epoch += 1;
        let email = respondent::resolve_respondent_email(
            self.visible_steps(),
            &self.answers,
            &self.identity,
        );
        SubmitTicket {
            epoch: self.epoch,
            submission: submission::package(self.instance_id.clone(), email, self.answers.clone()),
        }
    }

    // === Teardown ===

    /// Stop the questionnaire. Results that arrive later are discarded and
    /// every further action is refused.
    pub fn teardown(&mut self) {
        if !self.torn_down {
            debug!(instance = %self.instance_id, state = self.state.name(), "torn down");
        }
        self.torn_down = true;
        self.epoch += 1;
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // === Helpers ===

    fn ensure_state(
        &self,
        action: &'static str,
        allowed: impl Fn(&FlowState) -> bool,
    ) -> Result<(), FlowError> {
        if self.torn_down {
            return Err(FlowError::TornDown);
        }
        if allowed(&self.state) {
            Ok(())
        } else {
            Err(FlowError::InvalidState {
                action,
                state: self.state.name(),
            })
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.torn_down || epoch != self.epoch
    }

    fn owner_of(&self, key: &AnswerKey) -> Result<usize, FlowError> {
        self.owners
            .get(key)
            .copied()
            .ok_or_else(|| FlowError::UnknownKey(key.clone()))
    }

    fn current_link_key(&self) -> Result<AnswerKey, FlowError> {
        match self.current_step().map(Step::kind) {
            Some(StepKind::ExternalAccountLink(link)) => Ok(link.key.clone()),
            Some(StepKind::IdentityGate(gate)) => Ok(gate.key.clone()),
            _ => Err(FlowError::NotALinkStep),
        }
    }

    fn after_edit(&mut self, key: &AnswerKey) {
        let gates_visibility = self
            .script
            .steps
            .iter()
            .any(|step| step.condition() == Some(key));
        if gates_visibility {
            self.refresh_visibility();
        }
    }

    fn refresh_visibility(&mut self) {
        let anchor = self.visible.get(self.position).copied();
        self.visible =
            visibility::visible_indices(&self.script.steps, &self.identity, &self.answers);
        self.position = match anchor {
            Some(anchor) => self
                .visible
                .iter()
                .position(|&index| index >= anchor)
                .unwrap_or_else(|| self.visible.len().saturating_sub(1)),
            None => 0,
        };
        debug!(
            instance = %self.instance_id,
            steps = self.visible.len(),
            position = self.position,
            "visible steps re-derived"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(steps: Vec<Step>) -> Questionnaire {
        loaded_with(steps, IdentitySnapshot::anonymous(), None)
    }

    fn loaded_with(
        steps: Vec<Step>,
        identity: IdentitySnapshot,
        prior: Option<Answers>,
    ) -> Questionnaire {
        let mut flow = Questionnaire::new("sid-1", identity);
        let ticket = flow.begin_load().unwrap();
        let mut fetched = FetchedScript::new(Script::new(steps));
        fetched.prior_answers = prior;
        flow.finish_load(ticket, Ok(fetched)).unwrap();
        flow
    }

    #[test]
    fn fresh_load_starts_at_first_step() {
        let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::anonymous());
        let ticket = flow.begin_load().unwrap();
        let script = Script::new(vec![
            Step::info("Welcome"),
            Step::identity_gate("intro_a", "Hi!", "Sign in or skip"),
            Step::free_text("context", "Tell us more"),
            Step::info("Bye"),
        ]);
        let started = flow.finish_load(ticket, Ok(FetchedScript::new(script))).unwrap();
        assert!(matches!(started, Settled::Applied(Started::Ready { position: 0 })));
        assert_eq!(flow.current_step().map(Step::kind_name), Some("info"));
    }

    #[test]
    fn empty_prior_answers_start_at_first_step() {
        let flow = loaded_with(
            vec![Step::info("Welcome"), Step::free_text("p1", "One")],
            IdentitySnapshot::anonymous(),
            Some(Answers::new()),
        );
        assert_eq!(flow.position(), 0);
    }

    #[test]
    fn actions_refused_while_loading() {
        let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::anonymous());
        assert!(matches!(
            flow.next(),
            Err(FlowError::InvalidState { state: "loading", .. })
        ));
        assert!(matches!(
            flow.set_answer("p1", "hi"),
            Err(FlowError::InvalidState { .. })
        ));
        assert_eq!(flow.state(), &FlowState::Loading);
    }

    #[test]
    fn failed_load_is_terminal() {
        let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::anonymous());
        let ticket = flow.begin_load().unwrap();
        let err = flow
            .finish_load(ticket, Err(ScriptLoadError::NotFound("sid-1".into())))
            .unwrap_err();
        assert!(matches!(err, FlowError::Load(ScriptLoadError::NotFound(_))));
        assert!(matches!(flow.state(), FlowState::Error(_)));
        assert!(flow.begin_load().is_err());
    }

    #[test]
    fn malformed_script_is_a_load_error() {
        let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::anonymous());
        let ticket = flow.begin_load().unwrap();
        let script = Script::new(vec![Step::scale("s", "Scale", 5, 1)]);
        assert!(flow.finish_load(ticket, Ok(FetchedScript::new(script))).is_err());
        assert!(matches!(flow.state(), FlowState::Error(_)));
    }

    #[test]
    fn superseded_load_ticket_is_discarded() {
        let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::anonymous());
        let first = flow.begin_load().unwrap();
        let second = flow.begin_load().unwrap();
        let script = FetchedScript::new(Script::new(vec![Step::info("Hi")]));

        assert!(matches!(
            flow.finish_load(first, Ok(script.clone())).unwrap(),
            Settled::Discarded
        ));
        assert!(matches!(
            flow.finish_load(second, Ok(script)).unwrap(),
            Settled::Applied(Started::Ready { position: 0 })
        ));
    }

    #[test]
    fn back_is_floored_at_zero_and_clears_message() {
        let mut flow = loaded(vec![Step::free_text("p1", "One"), Step::info("Bye")]);
        assert!(flow.next().is_err());
        assert!(flow.message().is_some());

        assert_eq!(flow.back().unwrap(), 0);
        assert_eq!(flow.message(), None);
    }

    #[test]
    fn next_refused_on_last_step() {
        let mut flow = loaded(vec![Step::info("Only")]);
        assert!(matches!(flow.next(), Err(FlowError::AtLastStep)));
        assert_eq!(flow.position(), 0);
    }

    #[test]
    fn submit_refused_before_last_step() {
        let mut flow = loaded(vec![Step::info("One"), Step::info("Two")]);
        assert!(matches!(flow.begin_submit(), Err(FlowError::NotAtLastStep)));
        assert_eq!(flow.state(), &FlowState::Active);
    }

    #[test]
    fn skip_only_on_link_steps() {
        let mut flow = loaded(vec![
            Step::free_text("p1", "One"),
            Step::account_link("wallet", "Wallet"),
            Step::info("Done"),
        ]);
        assert!(matches!(flow.skip(), Err(FlowError::NotSkippable("free_text"))));

        flow.set_answer("p1", "hi").unwrap();
        flow.next().unwrap();
        assert_eq!(flow.skip().unwrap(), 2);
    }

    #[test]
    fn unknown_keys_are_refused() {
        let mut flow = loaded(vec![Step::free_text("p1", "One")]);
        assert!(matches!(
            flow.set_answer("nope", "x"),
            Err(FlowError::UnknownKey(_))
        ));
        assert!(flow.answers().is_empty());
    }

    #[test]
    fn blank_text_removes_answer() {
        let mut flow = loaded(vec![Step::free_text("p1", "One"), Step::info("Bye")]);
        flow.set_answer("p1", "hi").unwrap();
        flow.set_answer("p1", "  ").unwrap();
        assert!(!flow.answers().contains(&AnswerKey::new("p1")));
    }

    #[test]
    fn linking_stores_identifier_and_provider() {
        let mut flow = loaded(vec![Step::account_link("wallet", "Wallet")]);
        flow.record_link(LinkedAccount::new("alice.near", "near")).unwrap();
        flow.record_link(LinkedAccount::new("0xabc", "evm")).unwrap();

        let answers = flow.answers();
        assert_eq!(answers.get_text(&AnswerKey::new("wallet")).unwrap(), "0xabc");
        assert_eq!(answers.get_text(&AnswerKey::new("wallet_provider")).unwrap(), "evm");

        flow.forget_link().unwrap();
        assert!(flow.answers().is_empty());
    }

    #[test]
    fn linking_refused_off_link_step() {
        let mut flow = loaded(vec![Step::free_text("p1", "One")]);
        assert!(matches!(
            flow.record_link(LinkedAccount::new("alice.near", "near")),
            Err(FlowError::NotALinkStep)
        ));
    }

    #[test]
    fn resume_restores_answers_and_position() {
        let prior: Answers = [("p1", "hi")].into_iter().collect();
        let flow = loaded_with(
            vec![Step::free_text("p1", "One"), Step::free_text("p2", "Two")],
            IdentitySnapshot::signed_in("t@x.com"),
            Some(prior.clone()),
        );
        assert_eq!(flow.position(), 1);
        assert_eq!(flow.answers(), &prior);
        assert_eq!(flow.progress(), Progress { current: 2, total: 2 });
        assert_eq!(flow.completion_percentage(), 50);
    }

    #[test]
    fn load_ticket_carries_signed_in_email() {
        let mut flow = Questionnaire::new("sid-1", IdentitySnapshot::signed_in("t@x.com"));
        let ticket = flow.begin_load().unwrap();
        assert_eq!(ticket.instance_id(), "sid-1");
        assert_eq!(ticket.respondent_email(), Some("t@x.com"));
    }

    #[test]
    fn teardown_refuses_further_actions() {
        let mut flow = loaded(vec![Step::info("One"), Step::info("Two")]);
        flow.teardown();
        assert!(matches!(flow.next(), Err(FlowError::TornDown)));
        assert_eq!(flow.position(), 0);
    }
}
