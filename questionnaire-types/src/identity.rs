use serde::{Deserialize, Serialize};

/// What the identity collaborator knows about the respondent, captured once
/// when the questionnaire loads.
///
/// The engine never polls ambient session state. A caller that learns about
/// a sign-in later hands the engine a fresh snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub signed_in: bool,
    pub email: Option<String>,
}

impl IdentitySnapshot {
    /// An anonymous respondent.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in respondent with the given email.
    pub fn signed_in(email: impl Into<String>) -> Self {
        Self {
            signed_in: true,
            email: Some(email.into()),
        }
    }

    /// The email to attribute answers to, if signed in with one that looks valid.
    pub fn email(&self) -> Option<&str> {
        if !self.signed_in {
            return None;
        }
        self.email.as_deref().map(str::trim).filter(|e| looks_like_email(e))
    }
}

/// The loose check the backend applies before attributing answers to a tester.
pub fn looks_like_email(candidate: &str) -> bool {
    let candidate = candidate.trim();
    !candidate.is_empty() && candidate.contains('@')
}

/// An external account returned by a linker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
    /// The account identifier (NEAR account id, EVM address, ...).
    pub identifier: String,

    /// Which kind of account it is, e.g. "near" or "evm".
    pub provider_tag: String,
}

impl LinkedAccount {
    pub fn new(identifier: impl Into<String>, provider_tag: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            provider_tag: provider_tag.into(),
        }
    }
}
