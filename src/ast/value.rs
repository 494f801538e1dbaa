use std::fmt;

/// Runtime value types used during formula evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
    Text(String),
    Null,
}

impl Value {
    /// Name used in type-mismatch diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Bool(_) => "Bool",
            Value::Text(_) => "Text",
            Value::Null => "Null",
        }
    }

    /// `false`, `null`, `0`, `NaN` and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Text(s) => !s.is_empty(),
            Value::Null => false,
        }
    }

    /// Numeric view of the value. Text must be a plain decimal literal
    /// (surrounding whitespace allowed, blank text reads as zero).
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Null => Some(0.0),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Some(0.0)
                } else {
                    parse_decimal(trimmed)
                }
            }
        }
    }

    /// Loose equality: numbers compare with numeric text, everything else by value.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(_), Value::Text(_)) | (Value::Text(_), Value::Number(_)) => {
                match (self.to_number(), other.to_number()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            (Value::Bool(_), Value::Number(_)) | (Value::Number(_), Value::Bool(_)) => {
                self.to_number() == other.to_number()
            }
            _ => self.strict_eq(other),
        }
    }

    /// Strict equality: same type and same value. `NaN` never equals itself.
    pub fn strict_eq(&self, other: &Value) -> bool {
        self == other
    }
}

/// Parses a decimal literal, rejecting the `inf`/`NaN` spellings `f64::from_str` accepts.
pub(crate) fn parse_decimal(s: &str) -> Option<f64> {
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
    {
        return None;
    }
    s.parse().ok()
}

/// Formats a number the way a form displays it: integral values have no fraction.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => write!(f, "{}", s),
            Value::Null => write!(f, "null"),
        }
    }
}

/// A named variable a formula reads from its scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputSource {
    pub name: String,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
