use super::FieldKind;
use crate::ast::Value;
use crate::ast::value::format_number;
use ahash::AHashMap;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used for date field values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The runtime value of one field.
///
/// Serialized untagged, so stored values look like plain JSON scalars:
/// `null`, `true`, `42`, `"1990-06-15"`, `"Jane"`, `["a", "b"]`.
/// Strings shaped like `YYYY-MM-DD` come back as [`FieldValue::Date`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
    List(Vec<String>),
}

/// Current value of every field in a fill-in session, keyed by field id.
pub type ValuesMap = AHashMap<String, FieldValue>;

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// `Empty`, `false`, `0`, `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Empty => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Date(_) | FieldValue::List(_) => true,
        }
    }

    /// True for values a `required` rule rejects.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Length of the string form, counted in UTF-16 code units.
    pub fn length(&self) -> usize {
        self.to_string().encode_utf16().count()
    }

    /// Calendar date held by the value, if it holds or spells one.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(date) => Some(*date),
            FieldValue::Text(s) => parse_date(s),
            _ => None,
        }
    }

    /// Converts raw input text into the variant matching the field kind.
    ///
    /// Text that does not fit a number or date field is kept as `Text` so
    /// validation still sees exactly what was typed.
    pub fn from_input(kind: FieldKind, raw: &str) -> Self {
        match kind {
            FieldKind::Text
            | FieldKind::Textarea
            | FieldKind::Select
            | FieldKind::Radio => FieldValue::Text(raw.to_string()),
            FieldKind::Checkbox => FieldValue::Bool(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "yes" | "1"
            )),
            FieldKind::Number => match raw.trim() {
                "" => FieldValue::Empty,
                trimmed => trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map_or_else(|| FieldValue::Text(raw.to_string()), FieldValue::Number),
            },
            FieldKind::Date => match raw.trim() {
                "" => FieldValue::Empty,
                trimmed => parse_date(trimmed)
                    .map_or_else(|| FieldValue::Text(raw.to_string()), FieldValue::Date),
            },
        }
    }

    /// The value as a formula sees it. Blank values read as the empty string.
    pub fn to_formula_value(&self) -> Value {
        match self {
            FieldValue::Empty => Value::Text(String::new()),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) => Value::Number(*n),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn from_formula_value(value: Value) -> Self {
        match value {
            Value::Number(n) => FieldValue::Number(n),
            Value::Bool(b) => FieldValue::Bool(b),
            Value::Text(s) => FieldValue::Text(s),
            Value::Null => FieldValue::Empty,
        }
    }
}

/// Accepts `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.date_naive())
    })
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", format_number(*n)),
            FieldValue::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(date: NaiveDate) -> Self {
        FieldValue::Date(date)
    }
}
