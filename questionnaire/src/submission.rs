//! Packaging and delivering the final answers.

use questionnaire_types::{
    Answers, Submission, SubmissionError, SubmissionReceipt, SubmissionSink,
};

/// Build the payload for one submit attempt.
pub fn package(
    instance_id: impl Into<String>,
    respondent_email: Option<String>,
    answers: Answers,
) -> Submission {
    Submission {
        instance_id: instance_id.into(),
        respondent_email,
        answers,
    }
}

/// Hand `submission` to the sink exactly once.
pub async fn deliver(
    sink: &dyn SubmissionSink,
    submission: &Submission,
) -> Result<SubmissionReceipt, SubmissionError> {
    tracing::debug!(
        instance = %submission.instance_id,
        answers = submission.answers.len(),
        attributed = submission.respondent_email.is_some(),
        "delivering submission"
    );
    sink.submit(submission).await
}

/// Treat a receipt that did not accept the answers as a failed attempt.
pub fn require_accepted(receipt: SubmissionReceipt) -> Result<SubmissionReceipt, SubmissionError> {
    if receipt.accepted {
        Ok(receipt)
    } else {
        Err(SubmissionError::Rejected(
            "the backend did not accept the answers".to_string(),
        ))
    }
}
