//! Core types for the questionnaire engine.
//!
//! This crate provides the foundational, presentation-agnostic types:
//! - `Script` and `Step` - The ordered step list and its closed set of kinds
//! - `Answers`, `AnswerKey` and `AnswerValue` - The flat answer store
//! - `IdentitySnapshot`, `Submission` - What goes in and comes out
//! - `ScriptProvider`, `IdentityProvider`, `AccountLinker`, `SubmissionSink` -
//!   The collaborator seams the engine talks to

mod answer_key;
pub use answer_key::AnswerKey;

mod answer_value;
pub use answer_value::AnswerValue;

mod answers;
pub use answers::{AnswerError, Answers};

mod step;
pub use step::{
    ATTEMPTS_SUFFIX, AccountLinkStep, ChoiceStep, IdentityGateStep, InfoStep, MultiRateStep,
    PROVIDER_SUFFIX, PreambleScaleStep, ProblemStep, PromptStep, REASON_SUFFIX, RateItem,
    SCORE_SUFFIX, ScaleStep, Step, StepKind, SubPrompts,
};

mod script;
pub use script::{FetchedScript, Script};

mod identity;
pub use identity::{IdentitySnapshot, LinkedAccount, looks_like_email};

mod submission;
pub use submission::{AnswerHashes, Submission, SubmissionReceipt};

mod error;
pub use error::{LinkError, ScriptLoadError, SubmissionError};

mod traits;
pub use traits::{AccountLinker, IdentityProvider, ScriptProvider, SubmissionSink};
