//! Resuming an interrupted questionnaire.
//!
//! Pure functions over the visible steps and previously stored answers. The
//! engine restores the stored answers verbatim and asks here where to start.

use questionnaire_types::{Answers, Step};

/// Whether every key `step` requires is filled in.
///
/// Steps that never block count as answered. A problem block with only its
/// score stored is unanswered.
pub fn is_answered(step: &Step, answers: &Answers) -> bool {
    step.required_keys().iter().all(|key| answers.has_value(key))
}

/// The position to resume at.
///
/// The first required step that is not fully answered; the last step when
/// every required step is answered, so the respondent lands on submit rather
/// than past the end; 0 when nothing is visible.
pub fn resume_position(visible: &[&Step], prior: &Answers) -> usize {
    visible
        .iter()
        .position(|step| step.is_required() && !is_answered(step, prior))
        .unwrap_or_else(|| visible.len().saturating_sub(1))
}

/// How much of the questionnaire is done, as a whole percentage of its
/// required steps. 0 when no step is required.
pub fn completion_percentage(steps: &[&Step], answers: &Answers) -> u8 {
    let required: Vec<_> = steps.iter().filter(|step| step.is_required()).collect();
    if required.is_empty() {
        return 0;
    }
    let answered = required
        .iter()
        .filter(|step| is_answered(step, answers))
        .count();
    let percent = answered * 100 / required.len();
    percent.min(100) as u8
}
