//! The rule-based validation engine.
//!
//! Rules are checked in declaration order and the first failure wins. All
//! predicates except `required` pass vacuously on a falsy value, so an empty
//! optional field never trips a length or format rule.

use crate::schema::{FieldValue, FormField, RuleKind, ValidationRule, ValuesMap};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

/// Returns the message of the first rule `value` fails, or `None` if it passes them all.
pub fn evaluate<'r>(rules: &'r [ValidationRule], value: Option<&FieldValue>) -> Option<&'r str> {
    rules
        .iter()
        .find(|rule| !is_valid_by_rule(rule, value))
        .map(|rule| rule.message.as_str())
}

/// Applies a single rule's predicate.
pub fn is_valid_by_rule(rule: &ValidationRule, value: Option<&FieldValue>) -> bool {
    if rule.kind == RuleKind::Required {
        return value.is_some_and(|v| !v.is_blank());
    }

    // Every other predicate is satisfied by a falsy value.
    let value = match value {
        Some(v) if v.is_truthy() => v,
        _ => return true,
    };
    let parameter = || rule.parameter.as_ref().map_or(f64::NAN, |p| p.as_number());

    match &rule.kind {
        RuleKind::MinLength => value.length() as f64 >= parameter(),
        RuleKind::MaxLength => value.length() as f64 <= parameter(),
        RuleKind::Email => EMAIL_PATTERN.is_match(&value.to_string()),
        RuleKind::CustomPassword => {
            let text = value.to_string();
            text.encode_utf16().count() >= 8 && text.chars().any(|c| c.is_ascii_digit())
        }
        RuleKind::Required | RuleKind::Unknown(_) => true,
    }
}

/// Validates one field against its current value in `values`.
pub fn validate_field<'f>(field: &'f FormField, values: &ValuesMap) -> Option<&'f str> {
    evaluate(&field.validation_rules, values.get(&field.id))
}

/// Failed fields of a form, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<(String, String)>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Message for `field_id`, if that field failed.
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(id, _)| id == field_id)
            .map(|(_, message)| message.as_str())
    }

    /// `(field id, message)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(id, m)| (id.as_str(), m.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (id, message)) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", id, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validates every field in display order.
pub fn validate_form(fields: &[FormField], values: &ValuesMap) -> ValidationErrors {
    let mut ordered: Vec<&FormField> = fields.iter().collect();
    ordered.sort_by_key(|f| f.order);

    let errors = ordered
        .into_iter()
        .filter_map(|field| {
            validate_field(field, values).map(|message| (field.id.clone(), message.to_string()))
        })
        .collect();
    ValidationErrors { errors }
}
