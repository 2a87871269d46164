use serde::{Deserialize, Serialize};

/// A single answer value stored in `Answers`.
///
/// Serialized as a bare JSON scalar so the store round-trips through the
/// backend's `answers` object unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// A yes/no answer (from Confirm steps).
    Bool(bool),

    /// An integer answer (scales, ratings).
    Number(i64),

    /// A non-integral number, as sent by clients that store every number as a float.
    Float(f64),

    /// A text answer (free text, email, choices, account identifiers).
    Text(String),
}

impl AnswerValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret this value as a whole number.
    ///
    /// Accepts integers, floats without a fractional part, and text that
    /// parses as an integer once trimmed (scale inputs typed into a text box).
    pub fn to_whole_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether this value counts as an answer: any number or bool, or text
    /// that is not blank.
    pub fn is_filled(&self) -> bool {
        match self {
            Self::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Number(_) => "Number",
            Self::Float(_) => "Float",
            Self::Text(_) => "Text",
        }
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for AnswerValue {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

impl From<f64> for AnswerValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for AnswerValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_number_coercion() {
        assert_eq!(AnswerValue::Number(4).to_whole_number(), Some(4));
        assert_eq!(AnswerValue::Float(4.0).to_whole_number(), Some(4));
        assert_eq!(AnswerValue::Float(4.5).to_whole_number(), None);
        assert_eq!(AnswerValue::from(" 3 ").to_whole_number(), Some(3));
        assert_eq!(AnswerValue::from("three").to_whole_number(), None);
        assert_eq!(AnswerValue::Bool(true).to_whole_number(), None);
    }

    #[test]
    fn blank_text_is_not_filled() {
        assert!(!AnswerValue::from("   ").is_filled());
        assert!(AnswerValue::from("hi").is_filled());
        assert!(AnswerValue::Number(0).is_filled());
        assert!(AnswerValue::Bool(false).is_filled());
    }

    #[test]
    fn deserializes_untagged_scalars() {
        let values: Vec<AnswerValue> = serde_json::from_str(r#"[true, 5, 2.5, "near"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AnswerValue::Bool(true),
                AnswerValue::Number(5),
                AnswerValue::Float(2.5),
                AnswerValue::from("near"),
            ]
        );
    }
}
