use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AnswerKey, AnswerValue};

/// Error type for typed answer access.
#[derive(Debug, thiserror::Error)]
pub enum AnswerError {
    #[error("Missing answer for key: {0}")]
    MissingKey(AnswerKey),

    #[error("Type mismatch at key '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        key: AnswerKey,
        expected: &'static str,
        actual: &'static str,
    },
}

/// The answer store for one questionnaire instance.
///
/// Keys are flat: a composite step's sub-answers live under their synthesized
/// keys (`pb_1_score`), not nested under the step key. Iteration and
/// serialization are ordered by key so the submitted `answers` object is
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: BTreeMap<AnswerKey, AnswerValue>,
}

impl Answers {
    /// Create a new empty answer store.
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Insert an answer at the given key, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<AnswerKey>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Get the answer at the given key.
    pub fn get(&self, key: &AnswerKey) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    /// Check if an answer exists at the given key.
    pub fn contains(&self, key: &AnswerKey) -> bool {
        self.values.contains_key(key)
    }

    /// Remove the answer at the given key.
    pub fn remove(&mut self, key: &AnswerKey) -> Option<AnswerValue> {
        self.values.remove(key)
    }

    /// Get an iterator over all key-value pairs, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&AnswerKey, &AnswerValue)> {
        self.values.iter()
    }

    /// Get the number of answers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no answers.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // === Convenience accessors ===

    /// Get a text answer at the given key.
    pub fn get_text(&self, key: &AnswerKey) -> Result<&str, AnswerError> {
        self.typed(key, "Text", AnswerValue::as_str)
    }

    /// Get an integer answer at the given key.
    pub fn get_number(&self, key: &AnswerKey) -> Result<i64, AnswerError> {
        self.typed(key, "Number", AnswerValue::as_int)
    }

    /// Get a boolean answer at the given key.
    pub fn get_bool(&self, key: &AnswerKey) -> Result<bool, AnswerError> {
        self.typed(key, "Bool", AnswerValue::as_bool)
    }

    fn typed<'a, T>(
        &'a self,
        key: &AnswerKey,
        expected: &'static str,
        read: impl FnOnce(&'a AnswerValue) -> Option<T>,
    ) -> Result<T, AnswerError> {
        let value = self
            .get(key)
            .ok_or_else(|| AnswerError::MissingKey(key.clone()))?;
        read(value).ok_or_else(|| AnswerError::TypeMismatch {
            key: key.clone(),
            expected,
            actual: value.type_name(),
        })
    }

    /// Check if the answer at the given key is present and filled in.
    ///
    /// Returns `false` if the answer is missing OR if it is blank text
    /// (a field the respondent cleared).
    pub fn has_value(&self, key: &AnswerKey) -> bool {
        self.get(key).is_some_and(AnswerValue::is_filled)
    }

    /// Whether the answer at `key` is boolean `true`. Anything else reads as no.
    pub fn is_yes(&self, key: &AnswerKey) -> bool {
        self.get(key).and_then(AnswerValue::as_bool) == Some(true)
    }
}

impl<K, V> FromIterator<(K, V)> for Answers
where
    K: Into<AnswerKey>,
    V: Into<AnswerValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Answers {
    type Item = (AnswerKey, AnswerValue);
    type IntoIter = std::collections::btree_map::IntoIter<AnswerKey, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Answers {
    type Item = (&'a AnswerKey, &'a AnswerValue);
    type IntoIter = std::collections::btree_map::Iter<'a, AnswerKey, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
