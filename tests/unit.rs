//! Unit tests for core Yoshiki types.
mod common;
use common::*;
use std::collections::HashSet;
use yoshiki::ast::{DisplayExpression, InputSource};
use yoshiki::prelude::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(0.1 + 0.2)), "0.30000000000000004");
    assert_eq!(format!("{}", Value::Number(-0.0)), "0");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Text("hi".to_string())), "hi");
    assert_eq!(format!("{}", Value::Null), "null");
}

#[test]
fn test_value_truthiness_and_equality() {
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::Number(f64::NAN).is_truthy());
    assert!(!Value::Text(String::new()).is_truthy());
    assert!(Value::Text("0".to_string()).is_truthy());

    assert!(Value::Number(1.0).loose_eq(&Value::Bool(true)));
    assert!(Value::Text(" 5 ".to_string()).loose_eq(&Value::Number(5.0)));
    assert!(!Value::Text("five".to_string()).loose_eq(&Value::Number(5.0)));
    assert!(!Value::Number(f64::NAN).strict_eq(&Value::Number(f64::NAN)));
    assert_eq!(Value::Text("inf".to_string()).to_number(), None);
}

#[test]
fn test_input_source_display() {
    let source = InputSource {
        name: "field_total".to_string(),
    };
    assert_eq!(format!("{}", source), "field_total");
}

#[test]
fn test_expression_referenced_variables() {
    let expr = Expression::And(
        Box::new(Expression::variable("field_a")),
        Box::new(Expression::Conditional {
            condition: Box::new(Expression::variable("field_b")),
            then: Box::new(Expression::Literal(Value::Number(1.0))),
            otherwise: Box::new(Expression::variable("field_a")),
        }),
    );

    let mut names = HashSet::new();
    expr.referenced_variables(&mut names);
    assert_eq!(names.len(), 2);
    assert!(names.contains("field_b"));
}

#[test]
fn test_display_expression_tree() {
    let formula = FormulaCompiler::default().compile("field_a + 'x'").unwrap();
    let rendered = DisplayExpression {
        expr: formula.ast(),
    }
    .to_string();
    assert_eq!(
        rendered,
        "└── Binary (+)\n    ├── Input: field_a\n    └── Literal: \"x\"\n"
    );
}

#[test]
fn test_trace_formatter_short_circuit() {
    let trace = EvaluationTrace::BinaryOp {
        op_symbol: "||",
        left: Box::new(EvaluationTrace::Leaf {
            source: "true".to_string(),
            value: Value::Bool(true),
        }),
        right: Box::new(EvaluationTrace::NotEvaluated),
        outcome: Value::Bool(true),
    };

    let formatted = TraceFormatter::format_trace(&trace);
    assert_eq!(formatted, "true"); // Should only show the decisive part
}

#[test]
fn test_trace_formatter_quotes_text_inputs() {
    let trace = EvaluationTrace::Call {
        name: "upper",
        args: vec![EvaluationTrace::Leaf {
            source: "field_name".to_string(),
            value: Value::Text(String::new()),
        }],
        outcome: Value::Text(String::new()),
    };
    assert_eq!(
        TraceFormatter::format_trace(&trace),
        "upper(field_name (was \"\"))"
    );
}

#[test]
fn test_field_value_serde() {
    let parsed: Vec<FieldValue> =
        serde_json::from_str(r#"[null, true, 3.5, "1990-06-15", "Jane", ["a", "b"]]"#).unwrap();
    assert_eq!(
        parsed,
        vec![
            FieldValue::Empty,
            FieldValue::Bool(true),
            FieldValue::Number(3.5),
            FieldValue::Date(date(1990, 6, 15)),
            FieldValue::text("Jane"),
            FieldValue::List(vec!["a".to_string(), "b".to_string()]),
        ]
    );
    assert_eq!(
        serde_json::to_string(&parsed).unwrap(),
        r#"[null,true,3.5,"1990-06-15","Jane",["a","b"]]"#
    );
}

#[test]
fn test_field_value_views() {
    assert_eq!(FieldValue::Number(3.0).to_string(), "3");
    assert_eq!(FieldValue::Empty.to_string(), "");
    assert!(FieldValue::Empty.is_blank());
    assert!(!FieldValue::Bool(false).is_blank());
    assert_eq!(FieldValue::text("héllo").length(), 5);
    assert_eq!(
        FieldValue::text("2024-03-01T12:00:00Z").as_date(),
        Some(date(2024, 3, 1))
    );
    assert_eq!(
        FieldValue::Empty.to_formula_value(),
        Value::Text(String::new())
    );
    assert_eq!(FieldValue::from_formula_value(Value::Null), FieldValue::Empty);
}

#[test]
fn test_variable_names() {
    let config = EngineConfig::default();
    assert_eq!(
        config.variable_name("3f2a-77c1"),
        "field_3f2a_77c1"
    );
    assert_eq!(config.variable_name("email"), "field_email");
}

#[test]
fn test_error_display() {
    let err = GraphError::Cycle {
        fields: vec!["x".to_string(), "y".to_string(), "x".to_string()],
    };
    assert_eq!(err.to_string(), "Derived fields form a cycle: x -> y -> x");

    let eval_err = EvaluationError::TypeMismatch {
        operation: "*".to_string(),
        expected: "Number".to_string(),
        found: Value::Bool(false),
    };
    assert!(eval_err.to_string().contains('*'));
    assert!(eval_err.to_string().contains("Number"));
    assert!(eval_err.to_string().contains("false"));

    let formula_err = FormulaError::UnexpectedCharacter {
        found: '#',
        position: 4,
    };
    assert!(formula_err.to_string().contains('#'));
    assert!(formula_err.to_string().contains('4'));

    let form_err = FormError::IndexOutOfRange { index: 5, len: 2 };
    assert!(form_err.to_string().contains("5"));

    let store_err = StoreError::FormNotFound("abc".to_string());
    assert!(store_err.to_string().contains("abc"));
}
