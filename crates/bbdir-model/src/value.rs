//! Typed cell values.
//!
//! The directory workbook stores every cell as JSON. Cells deserialize into
//! the narrowest matching [`Value`] variant, so a row read from disk and
//! written back keeps its shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single attribute value of an entity row.
///
/// Single references are plain [`Value::Text`] ids. Multi-valued textual
/// fields are stored as a comma-joined [`Value::Text`] of sorted, unique
/// tokens; [`Value::Refs`] carries multi-references that arrive as arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Decimal(f64),
    Date(NaiveDate),
    Text(String),
    Refs(Vec<String>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Text value, or `Null` when the input is blank.
    pub fn text_or_null(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Null
        } else {
            Self::Text(value)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// True for `Null`, blank text and empty reference lists.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::Refs(values) => values.is_empty(),
            _ => false,
        }
    }

    /// Render the value the way a spreadsheet cell would show it.
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Int(value) => value.to_string(),
            Self::Decimal(value) => value.to_string(),
            Self::Date(value) => value.format("%Y-%m-%d").to_string(),
            Self::Text(value) => value.clone(),
            Self::Refs(values) => values.join(","),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_narrowest_variant() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 2.5, "2021-04-01", "text", ["a", "b"]]"#)
                .expect("parse values");
        assert_eq!(values[0], Value::Null);
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Int(3));
        assert_eq!(values[3], Value::Decimal(2.5));
        assert_eq!(
            values[4],
            Value::Date(NaiveDate::from_ymd_opt(2021, 4, 1).expect("date"))
        );
        assert_eq!(values[5], Value::text("text"));
        assert_eq!(values[6], Value::Refs(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn date_renders_back_to_iso() {
        let value: Value = serde_json::from_str(r#""2021-04-01""#).expect("parse date");
        assert_eq!(
            serde_json::to_string(&value).expect("serialize"),
            r#""2021-04-01""#
        );
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(Value::text("  ").is_empty());
        assert!(Value::text_or_null(" ").is_empty());
        assert!(!Value::Int(0).is_empty());
    }
}
