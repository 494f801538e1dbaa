//! Tests for the rule-based validation engine.
mod common;
use common::*;
use yoshiki::prelude::*;
use yoshiki::validation::{is_valid_by_rule, validate_form};

fn text(s: &str) -> FieldValue {
    FieldValue::text(s)
}

#[test]
fn test_required_rule() {
    let rule = ValidationRule::required("Required");
    assert!(!is_valid_by_rule(&rule, None));
    assert!(!is_valid_by_rule(&rule, Some(&FieldValue::Empty)));
    assert!(!is_valid_by_rule(&rule, Some(&text(""))));
    assert!(is_valid_by_rule(&rule, Some(&text("x"))));
    // Only absent or blank values fail; false and zero are answers.
    assert!(is_valid_by_rule(&rule, Some(&FieldValue::Bool(false))));
    assert!(is_valid_by_rule(&rule, Some(&FieldValue::Number(0.0))));
}

#[test]
fn test_email_rule() {
    let rule = ValidationRule::email("Bad email");
    assert!(is_valid_by_rule(&rule, Some(&text("a@b.co"))));
    assert!(!is_valid_by_rule(&rule, Some(&text("a@@b.co"))));
    assert!(!is_valid_by_rule(&rule, Some(&text("a b@c.de"))));
    assert!(!is_valid_by_rule(&rule, Some(&text("no-at-sign.com"))));
    // Empty optional input is not checked.
    assert!(is_valid_by_rule(&rule, Some(&text(""))));
    assert!(is_valid_by_rule(&rule, None));
}

#[test]
fn test_custom_password_rule() {
    let rule = ValidationRule::custom_password("Weak password");
    assert!(is_valid_by_rule(&rule, Some(&text("abcdefg1"))));
    assert!(!is_valid_by_rule(&rule, Some(&text("abcdefg"))));
    assert!(!is_valid_by_rule(&rule, Some(&text("abcdefgh"))));
    assert!(!is_valid_by_rule(&rule, Some(&text("ab1"))));
    assert!(is_valid_by_rule(&rule, Some(&text(""))));
}

#[test]
fn test_length_rules() {
    let min = ValidationRule::min_length(3, "Too short");
    let max = ValidationRule::max_length(5, "Too long");

    assert!(!is_valid_by_rule(&min, Some(&text("ab"))));
    assert!(is_valid_by_rule(&min, Some(&text("abc"))));
    assert!(is_valid_by_rule(&max, Some(&text("abcde"))));
    assert!(!is_valid_by_rule(&max, Some(&text("abcdef"))));

    // Numbers are measured by their string form.
    assert!(!is_valid_by_rule(&min, Some(&FieldValue::Number(42.0))));
    assert!(is_valid_by_rule(&min, Some(&FieldValue::Number(1234.0))));

    // Length counts UTF-16 code units.
    assert!(is_valid_by_rule(&min, Some(&text("😀a"))));
}

#[test]
fn test_length_rule_without_parameter_fails_non_empty_values() {
    let rule = ValidationRule::new(RuleKind::MinLength, "Too short");
    assert!(!is_valid_by_rule(&rule, Some(&text("anything"))));
    assert!(is_valid_by_rule(&rule, Some(&text(""))));
}

#[test]
fn test_unknown_rule_passes() {
    let rule: ValidationRule =
        serde_json::from_str(r#"{ "type": "phoneNumber", "message": "Bad phone" }"#).unwrap();
    assert_eq!(rule.kind, RuleKind::Unknown("phoneNumber".to_string()));
    assert!(is_valid_by_rule(&rule, Some(&text("not a phone"))));
}

#[test]
fn test_first_failing_rule_wins() {
    let rules = vec![
        ValidationRule::required("Required"),
        ValidationRule::min_length(8, "Too short"),
        ValidationRule::custom_password("Needs a digit"),
    ];
    assert_eq!(validate(&rules, None), Some("Required"));
    assert_eq!(validate(&rules, Some(&text("abc"))), Some("Too short"));
    assert_eq!(validate(&rules, Some(&text("abcdefgh"))), Some("Needs a digit"));
    assert_eq!(validate(&rules, Some(&text("abcdefg1"))), None);
    assert_eq!(validate(&[], None), None);
}

#[test]
fn test_required_flag_alone_adds_no_rule() {
    let mut field = input_field("name", FieldKind::Text, 0);
    field.required = true;
    let errors = validate_form(&[field], &ValuesMap::new());
    assert!(errors.is_empty());
}

#[test]
fn test_validate_form_reports_in_display_order() {
    let mut second = input_field("second", FieldKind::Text, 1);
    second.validation_rules = vec![ValidationRule::required("Second is required")];
    let mut first = input_field("first", FieldKind::Text, 0);
    first.validation_rules = vec![ValidationRule::email("First must be an email")];

    let values = values(&[("first", text("nope"))]);
    let errors = validate_form(&[second, first], &values);

    assert_eq!(errors.len(), 2);
    let ids: Vec<&str> = errors.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["first", "second"]);
    assert_eq!(errors.get("second"), Some("Second is required"));
    assert_eq!(
        errors.to_string(),
        "first: First must be an email\nsecond: Second is required"
    );
}

#[test]
fn test_rule_json_shape() {
    let rule = ValidationRule::min_length(4, "Too short");
    let json = serde_json::to_value(&rule).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "type": "minLength", "value": 4.0, "message": "Too short" })
    );

    // Parameters stored as text are read numerically.
    let rule: ValidationRule =
        serde_json::from_str(r#"{ "type": "maxLength", "value": "3", "message": "Too long" }"#)
            .unwrap();
    assert!(!is_valid_by_rule(&rule, Some(&text("abcd"))));
}
