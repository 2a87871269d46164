use serde::{Deserialize, Serialize};

use crate::Answers;

/// The single payload sent when a questionnaire is submitted.
///
/// Field names follow the backend's `/responses_sb` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(rename = "session_id")]
    pub instance_id: String,

    #[serde(rename = "tester_email", skip_serializing_if = "Option::is_none")]
    pub respondent_email: Option<String>,

    /// Opaque to the engine beyond what validation already checked.
    pub answers: Answers,
}

/// The backend's acknowledgement of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(alias = "ok")]
    pub accepted: bool,

    /// Digests the backend computed over the stored answers, when it reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashes: Option<AnswerHashes>,
}

impl SubmissionReceipt {
    /// A plain acceptance without digests.
    pub fn accepted() -> Self {
        Self {
            accepted: true,
            hashes: None,
        }
    }
}

/// Digests of the canonical answers JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerHashes {
    pub sha256: String,
    pub keccak: String,
}
