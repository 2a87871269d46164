//! Who the submission is attributed to.

use questionnaire_types::{Answers, IdentitySnapshot, Step, StepKind, looks_like_email};

/// Resolve the respondent email attached to a submission.
///
/// An email the respondent typed into one of `steps` wins over the signed-in
/// identity; the first email step (in the order given) holding something that
/// looks like an email is used. Without either, the submission is anonymous.
pub fn resolve_respondent_email<'a>(
    steps: impl IntoIterator<Item = &'a Step>,
    answers: &Answers,
    identity: &IdentitySnapshot,
) -> Option<String> {
    steps
        .into_iter()
        .filter_map(|step| match step.kind() {
            StepKind::Email(email) => answers.get(&email.key),
            _ => None,
        })
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|candidate| looks_like_email(candidate))
        .or_else(|| identity.email())
        .map(str::to_string)
}
