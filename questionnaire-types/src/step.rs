use serde::{Deserialize, Serialize};

use crate::AnswerKey;

/// The suffix for the provider tag stored beside an external account identifier.
/// For a step keyed "wallet", the provider is stored at "wallet_provider".
pub const PROVIDER_SUFFIX: &str = "provider";

/// The suffix for a problem block's score. For "pb_1", stored at "pb_1_score".
pub const SCORE_SUFFIX: &str = "score";

/// The suffix for a problem block's reason. For "pb_1", stored at "pb_1_reason".
pub const REASON_SUFFIX: &str = "reason";

/// The suffix for a problem block's attempts. For "pb_1", stored at "pb_1_attempts".
pub const ATTEMPTS_SUFFIX: &str = "attempts";

/// A single step in a questionnaire script.
///
/// Steps are immutable once fetched. The engine only moves its position
/// through them and edits the answer store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// What the step asks and which answers it produces.
    #[serde(flatten)]
    kind: StepKind,

    /// The step is only shown while the answer at this key is `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visible_when: Option<AnswerKey>,
}

impl Step {
    /// Create a new, always-visible step.
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            visible_when: None,
        }
    }

    /// Only show this step while the answer at `key` is `true`.
    pub fn visible_when(mut self, key: impl Into<AnswerKey>) -> Self {
        self.visible_when = Some(key.into());
        self
    }

    /// An informational step with nothing to answer.
    pub fn info(prompt: impl Into<String>) -> Self {
        Self::new(StepKind::Info(InfoStep {
            key: None,
            prompt: prompt.into(),
        }))
    }

    /// A free text step.
    pub fn free_text(key: impl Into<AnswerKey>, prompt: impl Into<String>) -> Self {
        Self::new(StepKind::FreeText(PromptStep::new(key, prompt)))
    }

    /// A free text step that may be left blank.
    pub fn optional_text(key: impl Into<AnswerKey>, prompt: impl Into<String>) -> Self {
        Self::new(StepKind::FreeText(PromptStep::new(key, prompt).optional()))
    }

    /// An (optional) email step.
    pub fn email(key: impl Into<AnswerKey>, prompt: impl Into<String>) -> Self {
        Self::new(StepKind::Email(PromptStep::new(key, prompt)))
    }

    /// A yes/no step.
    pub fn confirm(key: impl Into<AnswerKey>, prompt: impl Into<String>) -> Self {
        Self::new(StepKind::Confirm(PromptStep::new(key, prompt)))
    }

    /// An integer scale with inclusive bounds.
    pub fn scale(
        key: impl Into<AnswerKey>,
        prompt: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(StepKind::Scale(ScaleStep {
            key: key.into(),
            prompt: prompt.into(),
            min,
            max,
        }))
    }

    /// A single choice from a list of option labels.
    pub fn single_choice<S: Into<String>>(
        key: impl Into<AnswerKey>,
        prompt: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(StepKind::SingleChoice(ChoiceStep {
            key: key.into(),
            prompt: prompt.into(),
            options: options.into_iter().map(Into::into).collect(),
        }))
    }

    /// An optional external account (wallet) link.
    pub fn account_link(key: impl Into<AnswerKey>, prompt: impl Into<String>) -> Self {
        Self::new(StepKind::ExternalAccountLink(AccountLinkStep {
            key: key.into(),
            prompt: prompt.into(),
            copy: None,
        }))
    }

    /// A sign-in/link step that disappears once the respondent is identified.
    pub fn identity_gate(
        key: impl Into<AnswerKey>,
        title: impl Into<String>,
        copy: impl Into<String>,
    ) -> Self {
        Self::new(StepKind::IdentityGate(IdentityGateStep {
            key: key.into(),
            title: title.into(),
            copy: copy.into(),
        }))
    }

    /// A problem block: a score plus two follow-up texts, answered together.
    pub fn problem(
        key: impl Into<AnswerKey>,
        prompt: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(StepKind::CompositeProblem(ProblemStep {
            key: key.into(),
            prompt: prompt.into(),
            min,
            max,
            labels: SubPrompts::default(),
        }))
    }

    /// A scale shown after a longer preamble.
    pub fn scale_with_preamble(
        key: impl Into<AnswerKey>,
        preamble: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(StepKind::ScaleWithPreamble(PreambleScaleStep::new(
            key, preamble, min, max,
        )))
    }

    /// A block of independent, optional ratings sharing one scale.
    pub fn multi_rate(
        title: impl Into<String>,
        preamble: impl Into<String>,
        items: Vec<RateItem>,
        min: i64,
        max: i64,
    ) -> Self {
        Self::new(StepKind::MultiRateBlock(MultiRateStep {
            title: title.into(),
            preamble: preamble.into(),
            items,
            min,
            max,
        }))
    }

    /// Get the step kind.
    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    /// The key of the boolean answer gating this step, if any.
    pub fn condition(&self) -> Option<&AnswerKey> {
        self.visible_when.as_ref()
    }

    /// The step's own key. Informational steps and rating blocks have none.
    pub fn key(&self) -> Option<&AnswerKey> {
        match &self.kind {
            StepKind::Info(_) | StepKind::MultiRateBlock(_) => None,
            StepKind::FreeText(s) | StepKind::Email(s) | StepKind::Confirm(s) => Some(&s.key),
            StepKind::Scale(s) => Some(&s.key),
            StepKind::SingleChoice(s) => Some(&s.key),
            StepKind::ExternalAccountLink(s) => Some(&s.key),
            StepKind::IdentityGate(s) => Some(&s.key),
            StepKind::CompositeProblem(s) => Some(&s.key),
            StepKind::ScaleWithPreamble(s) => Some(&s.key),
        }
    }

    /// Every answer key this step can produce.
    pub fn answer_keys(&self) -> Vec<AnswerKey> {
        match &self.kind {
            StepKind::Info(_) => Vec::new(),
            StepKind::ExternalAccountLink(AccountLinkStep { key, .. })
            | StepKind::IdentityGate(IdentityGateStep { key, .. }) => {
                vec![key.clone(), key.suffixed(PROVIDER_SUFFIX)]
            }
            StepKind::CompositeProblem(problem) => problem.sub_keys().to_vec(),
            StepKind::MultiRateBlock(block) => {
                block.items.iter().map(|item| item.key.clone()).collect()
            }
            _ => self.key().cloned().into_iter().collect(),
        }
    }

    /// The keys that must all be filled for this step to count as answered.
    /// Empty for steps that never block.
    pub fn required_keys(&self) -> Vec<AnswerKey> {
        match &self.kind {
            StepKind::FreeText(PromptStep { optional: true, .. }) => Vec::new(),
            StepKind::FreeText(PromptStep { key, .. })
            | StepKind::Scale(ScaleStep { key, .. })
            | StepKind::SingleChoice(ChoiceStep { key, .. })
            | StepKind::ScaleWithPreamble(PreambleScaleStep { key, .. }) => vec![key.clone()],
            StepKind::CompositeProblem(problem) => problem.sub_keys().to_vec(),
            StepKind::Info(_)
            | StepKind::Email(_)
            | StepKind::Confirm(_)
            | StepKind::ExternalAccountLink(_)
            | StepKind::IdentityGate(_)
            | StepKind::MultiRateBlock(_) => Vec::new(),
        }
    }

    /// Whether this step must be answered before moving on.
    pub fn is_required(&self) -> bool {
        !self.required_keys().is_empty()
    }

    /// Whether the step offers a skip action that bypasses validation.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self.kind,
            StepKind::ExternalAccountLink(_) | StepKind::IdentityGate(_)
        )
    }

    /// Whether the step is hidden once the respondent is identified.
    pub fn is_identity_gate(&self) -> bool {
        matches!(self.kind, StepKind::IdentityGate(_))
    }

    /// The canonical wire name of this step's kind.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// The kind of step, determining its fields and the answers it produces.
///
/// The legacy backend tags are accepted as aliases when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Read-only copy, acknowledged with "next".
    #[serde(alias = "text")]
    Info(InfoStep),

    /// Free text answer.
    #[serde(alias = "input_text")]
    FreeText(PromptStep),

    /// Email answer. Never required.
    #[serde(alias = "input_email")]
    Email(PromptStep),

    /// Integer within inclusive bounds.
    #[serde(alias = "input_scale")]
    Scale(ScaleStep),

    /// One of a list of options.
    #[serde(alias = "input_choice")]
    SingleChoice(ChoiceStep),

    /// Optional wallet/external account link.
    #[serde(alias = "input_wallet")]
    ExternalAccountLink(AccountLinkStep),

    /// Sign-in/link step omitted for identified respondents.
    #[serde(alias = "account_setup")]
    IdentityGate(IdentityGateStep),

    /// Score, reason and attempts for one problem statement.
    #[serde(alias = "problem_block")]
    CompositeProblem(ProblemStep),

    /// Scale introduced by a preamble (e.g. the pitch page).
    ScaleWithPreamble(PreambleScaleStep),

    /// Several optional ratings on one scale.
    MultiRateBlock(MultiRateStep),

    /// Yes/no.
    Confirm(PromptStep),
}

impl StepKind {
    /// The canonical wire name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Info(_) => "info",
            Self::FreeText(_) => "free_text",
            Self::Email(_) => "email",
            Self::Scale(_) => "scale",
            Self::SingleChoice(_) => "single_choice",
            Self::ExternalAccountLink(_) => "external_account_link",
            Self::IdentityGate(_) => "identity_gate",
            Self::CompositeProblem(_) => "composite_problem",
            Self::ScaleWithPreamble(_) => "scale_with_preamble",
            Self::MultiRateBlock(_) => "multi_rate_block",
            Self::Confirm(_) => "confirm",
        }
    }
}

/// An informational step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoStep {
    /// Scripts sometimes key their info pages; the key never stores an answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<AnswerKey>,

    #[serde(alias = "label")]
    pub prompt: String,
}

/// A step with a key and a prompt (free text, email, confirm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptStep {
    pub key: AnswerKey,

    #[serde(alias = "label")]
    pub prompt: String,

    /// Free text only: the answer may be left blank.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
}

impl PromptStep {
    /// Create a new prompt step.
    pub fn new(key: impl Into<AnswerKey>, prompt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            optional: false,
        }
    }

    /// Allow the answer to be left blank.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Configuration for an integer scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleStep {
    pub key: AnswerKey,

    #[serde(alias = "label")]
    pub prompt: String,

    /// Inclusive minimum.
    pub min: i64,

    /// Inclusive maximum.
    pub max: i64,
}

/// Configuration for a single choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceStep {
    pub key: AnswerKey,

    #[serde(alias = "label")]
    pub prompt: String,

    /// Option labels in display order. The label itself is stored as the answer.
    pub options: Vec<String>,
}

/// Configuration for an external account link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountLinkStep {
    pub key: AnswerKey,

    #[serde(alias = "label")]
    pub prompt: String,

    /// Supporting copy, e.g. "Optional: connecting helps verify your responses later."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy: Option<String>,
}

/// Configuration for an identity gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityGateStep {
    pub key: AnswerKey,
    pub title: String,
    pub copy: String,
}

/// Configuration for a problem block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemStep {
    pub key: AnswerKey,

    /// The problem statement.
    #[serde(alias = "problem")]
    pub prompt: String,

    pub min: i64,
    pub max: i64,

    #[serde(default)]
    pub labels: SubPrompts,
}

impl ProblemStep {
    /// The score, reason and attempts keys, in that order.
    pub fn sub_keys(&self) -> [AnswerKey; 3] {
        [
            self.score_key(),
            self.reason_key(),
            self.attempts_key(),
        ]
    }

    pub fn score_key(&self) -> AnswerKey {
        self.key.suffixed(SCORE_SUFFIX)
    }

    pub fn reason_key(&self) -> AnswerKey {
        self.key.suffixed(REASON_SUFFIX)
    }

    pub fn attempts_key(&self) -> AnswerKey {
        self.key.suffixed(ATTEMPTS_SUFFIX)
    }
}

/// The three prompts of a problem block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubPrompts {
    pub scale: String,
    pub reason: String,
    pub attempts: String,
}

impl Default for SubPrompts {
    fn default() -> Self {
        Self {
            scale: "How strongly do you relate to this? (1=no care, 5=HUGE problem)".to_string(),
            reason: "Can you tell me more about why you gave that score?".to_string(),
            attempts: "Have you ever taken any steps to try to tackle this? How did it go?"
                .to_string(),
        }
    }
}

/// Configuration for a scale shown after a preamble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreambleScaleStep {
    pub key: AnswerKey,
    pub preamble: String,

    /// Optional short question under the preamble.
    #[serde(default, alias = "label", skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    pub min: i64,
    pub max: i64,
}

impl PreambleScaleStep {
    pub fn new(
        key: impl Into<AnswerKey>,
        preamble: impl Into<String>,
        min: i64,
        max: i64,
    ) -> Self {
        Self {
            key: key.into(),
            preamble: preamble.into(),
            prompt: None,
            min,
            max,
        }
    }

    /// Add the short question shown under the preamble.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

/// Configuration for a block of ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRateStep {
    pub title: String,

    #[serde(default)]
    pub preamble: String,

    pub items: Vec<RateItem>,

    /// Shared inclusive minimum.
    pub min: i64,

    /// Shared inclusive maximum.
    pub max: i64,
}

/// One rating in a multi-rate block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateItem {
    pub key: AnswerKey,
    pub label: String,
}

impl RateItem {
    pub fn new(key: impl Into<AnswerKey>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}
