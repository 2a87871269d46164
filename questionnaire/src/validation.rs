//! Per-step validation rules.
//!
//! One total function over the step kind decides whether the respondent may
//! move past a step. Adding a kind makes the match non-exhaustive, so every
//! new kind has to pick a rule here.

use questionnaire_types::{AnswerKey, AnswerValue, Answers, Step, StepKind};

/// Shown when a required answer is missing.
pub const ANSWER_REQUIRED: &str = "Please answer to continue";

/// Shown when a scale holds something that is not a whole number.
pub const ENTER_A_NUMBER: &str = "Enter a number";

/// Why a step cannot be passed yet. Recoverable: the respondent fixes the
/// answer and tries again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decide whether `step` may be passed with the current answers.
///
/// Info, email, confirm, account link, identity gate and rating block steps
/// never block. Everything else needs its answers present and, for scales,
/// within the step's inclusive bounds.
pub fn can_advance(step: &Step, answers: &Answers) -> Result<(), ValidationError> {
    match step.kind() {
        StepKind::Info(_)
        | StepKind::Email(_)
        | StepKind::Confirm(_)
        | StepKind::ExternalAccountLink(_)
        | StepKind::IdentityGate(_)
        | StepKind::MultiRateBlock(_) => Ok(()),

        StepKind::FreeText(text) if text.optional => Ok(()),
        StepKind::FreeText(text) => require_filled(answers, &text.key, ANSWER_REQUIRED),

        // Option membership is the renderer's job; only presence is checked.
        StepKind::SingleChoice(choice) => {
            require_filled(answers, &choice.key, "Please choose an option")
        }

        StepKind::Scale(scale) => {
            check_bounds(answers.get(&scale.key), scale.min, scale.max, ANSWER_REQUIRED)
        }

        StepKind::ScaleWithPreamble(scale) => {
            check_bounds(answers.get(&scale.key), scale.min, scale.max, ANSWER_REQUIRED)
        }

        StepKind::CompositeProblem(problem) => {
            check_bounds(
                answers.get(&problem.score_key()),
                problem.min,
                problem.max,
                "Please rate how strongly you relate to this",
            )?;
            require_filled(
                answers,
                &problem.reason_key(),
                "Please tell us why you gave that score",
            )?;
            require_filled(
                answers,
                &problem.attempts_key(),
                "Please tell us whether you have tried to tackle this",
            )
        }
    }
}

/// Shape a value before it is stored under `key`.
///
/// Ratings in a multi-rate block are clamped into the block's range, and
/// ratings that are not numbers are dropped (`None`). Every other value is
/// stored as given.
pub fn normalize(step: &Step, key: &AnswerKey, value: AnswerValue) -> Option<AnswerValue> {
    let StepKind::MultiRateBlock(block) = step.kind() else {
        return Some(value);
    };
    if !block.items.iter().any(|item| &item.key == key) || !value.is_filled() {
        return Some(value);
    }
    value
        .to_whole_number()
        .map(|n| AnswerValue::Number(n.clamp(block.min, block.max)))
}

fn require_filled(answers: &Answers, key: &AnswerKey, message: &str) -> Result<(), ValidationError> {
    if answers.has_value(key) {
        Ok(())
    } else {
        Err(ValidationError::new(message))
    }
}

fn check_bounds(
    value: Option<&AnswerValue>,
    min: i64,
    max: i64,
    missing: &str,
) -> Result<(), ValidationError> {
    let Some(value) = value.filter(|v| v.is_filled()) else {
        return Err(ValidationError::new(missing));
    };
    let Some(n) = value.to_whole_number() else {
        return Err(ValidationError::new(ENTER_A_NUMBER));
    };
    if n < min {
        return Err(ValidationError::new(format!("Minimum is {min}")));
    }
    if n > max {
        return Err(ValidationError::new(format!("Maximum is {max}")));
    }
    Ok(())
}
