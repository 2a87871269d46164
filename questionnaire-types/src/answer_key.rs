use std::fmt;

use serde::{Deserialize, Serialize};

/// The key under which an answer is stored, e.g. `"pb_1"`.
///
/// Composite steps synthesize sub-keys from their own key with an underscore
/// suffix, so a problem block keyed `pb_1` stores `pb_1_score`, `pb_1_reason`
/// and `pb_1_attempts`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerKey {
    key: String,
}

impl AnswerKey {
    /// Create a new key.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Derive a sub-key by appending `_suffix`, returning a new key.
    pub fn suffixed(&self, suffix: &str) -> Self {
        if suffix.is_empty() {
            self.clone()
        } else if self.key.is_empty() {
            Self::new(suffix)
        } else {
            Self::new(format!("{}_{}", self.key, suffix))
        }
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Check if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl From<&str> for AnswerKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AnswerKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for AnswerKey {
    fn from(s: &String) -> Self {
        Self::new(s.clone())
    }
}

impl From<&AnswerKey> for AnswerKey {
    fn from(key: &AnswerKey) -> Self {
        key.clone()
    }
}
