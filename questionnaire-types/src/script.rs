use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Answers, ScriptLoadError, Step, StepKind};

/// The ordered steps of one questionnaire.
///
/// A script is presentation-agnostic: the same list drives the respondent
/// questionnaire and the founder intake wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// All steps in display order, before visibility filtering.
    pub steps: Vec<Step>,
}

impl Script {
    /// Create a new script with the given steps.
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Get the steps.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Check if the script has any steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Get the number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reject scripts the engine cannot run.
    ///
    /// Fails when two steps produce the same answer key, a scale has
    /// `min > max`, a single choice has no options, or a rating block has no
    /// items.
    pub fn check(&self) -> Result<(), ScriptLoadError> {
        let mut seen = HashSet::new();
        for (index, step) in self.steps.iter().enumerate() {
            for key in step.answer_keys() {
                if !seen.insert(key.clone()) {
                    return Err(ScriptLoadError::Malformed(format!(
                        "answer key '{key}' is produced by more than one step (again at step {index})"
                    )));
                }
            }

            let bounds = match step.kind() {
                StepKind::Scale(s) => Some((s.min, s.max)),
                StepKind::ScaleWithPreamble(s) => Some((s.min, s.max)),
                StepKind::CompositeProblem(s) => Some((s.min, s.max)),
                StepKind::MultiRateBlock(s) => Some((s.min, s.max)),
                _ => None,
            };
            if let Some((min, max)) = bounds
                && min > max
            {
                return Err(ScriptLoadError::Malformed(format!(
                    "step {index} ({}) has min {min} greater than max {max}",
                    step.kind_name()
                )));
            }

            match step.kind() {
                StepKind::SingleChoice(choice) if choice.options.is_empty() => {
                    return Err(ScriptLoadError::Malformed(format!(
                        "single choice '{}' has no options",
                        choice.key
                    )));
                }
                StepKind::MultiRateBlock(block) if block.items.is_empty() => {
                    return Err(ScriptLoadError::Malformed(format!(
                        "rating block '{}' has no items",
                        block.title
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// What a script provider returns: the steps, plus the respondent's earlier
/// answers when resuming.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedScript {
    pub script: Script,
    pub prior_answers: Option<Answers>,
}

impl FetchedScript {
    /// A fresh script with nothing to resume.
    pub fn new(script: Script) -> Self {
        Self {
            script,
            prior_answers: None,
        }
    }

    /// Attach previously stored answers.
    pub fn with_prior_answers(mut self, answers: Answers) -> Self {
        self.prior_answers = Some(answers);
        self
    }
}
