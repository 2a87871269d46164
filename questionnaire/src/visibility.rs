//! Which steps are shown.

use questionnaire_types::{Answers, IdentitySnapshot, Step};

/// Whether `step` is part of the visible sequence.
///
/// Identity gates are dropped for identified respondents; steps with a
/// condition are shown only while the answer at the condition key is `true`.
pub fn is_visible(step: &Step, identity: &IdentitySnapshot, answers: &Answers) -> bool {
    if step.is_identity_gate() && identity.signed_in {
        return false;
    }
    step.condition().is_none_or(|key| answers.is_yes(key))
}

/// Indices into `steps` of the visible sequence, in script order.
pub fn visible_indices(steps: &[Step], identity: &IdentitySnapshot, answers: &Answers) -> Vec<usize> {
    steps
        .iter()
        .enumerate()
        .filter(|(_, step)| is_visible(step, identity, answers))
        .map(|(index, _)| index)
        .collect()
}
