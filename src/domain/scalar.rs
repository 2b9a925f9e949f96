//! Scalar values flowing through the masking layer

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single masked or unmasked field value
///
/// Masking techniques match on this closed set exhaustively, so every
/// (technique, shape) pairing is an explicit decision.
///
/// # Examples
///
/// ```
/// use cloak::domain::ScalarValue;
///
/// assert_eq!(ScalarValue::from(42).to_string(), "42");
/// assert_eq!(ScalarValue::from(10.0).to_string(), "10.0");
/// assert_eq!(ScalarValue::from("10001").as_text(), Some("10001"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
}

impl ScalarValue {
    /// Returns the text if this is a `Text` value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a text value made only of ASCII digits
    pub fn is_digit_text(&self) -> bool {
        matches!(self, Self::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
    }

    /// Short name of the variant, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing ".0" on whole floats
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for ScalarValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(ScalarValue::Int(-7).to_string(), "-7");
        assert_eq!(ScalarValue::Float(2.5).to_string(), "2.5");
        assert_eq!(ScalarValue::Float(3.0).to_string(), "3.0");
        assert_eq!(ScalarValue::Text("abc".into()).to_string(), "abc");
    }

    #[test]
    fn test_digit_text() {
        assert!(ScalarValue::from("12345").is_digit_text());
        assert!(!ScalarValue::from("12a45").is_digit_text());
        assert!(!ScalarValue::from("").is_digit_text());
        assert!(!ScalarValue::from(12345).is_digit_text());
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<ScalarValue> = serde_json::from_str(r#"[1, 1.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                ScalarValue::Int(1),
                ScalarValue::Float(1.5),
                ScalarValue::Text("x".into())
            ]
        );
    }
}
