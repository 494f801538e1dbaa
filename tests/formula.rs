//! Tests for the formula compiler and interpreter.
use yoshiki::ast::{BinaryOp, Builtin};
use yoshiki::formula::lexer::{TokenKind, tokenize};
use yoshiki::interpreter::Scope;
use yoshiki::prelude::*;
use std::result::Result;

fn scope(pairs: &[(&str, Value)]) -> Scope {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

fn eval(source: &str, scope: &Scope) -> Result<Value, EvaluationError> {
    FormulaCompiler::default()
        .compile(source)
        .expect("formula should compile")
        .evaluate_value(scope)
}

fn eval_empty(source: &str) -> Value {
    eval(source, &Scope::new()).unwrap()
}

#[test]
fn test_tokenize() {
    let tokens = tokenize("max(a, 1.5e2) >= 'x\\'y'").unwrap();
    let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Ident("max".to_string()),
            TokenKind::LParen,
            TokenKind::Ident("a".to_string()),
            TokenKind::Comma,
            TokenKind::Number(150.0),
            TokenKind::RParen,
            TokenKind::GreaterEq,
            TokenKind::Text("x'y".to_string()),
        ]
    );

    assert_eq!(
        tokenize("a # b").unwrap_err(),
        FormulaError::UnexpectedCharacter {
            found: '#',
            position: 2
        }
    );
    assert_eq!(
        tokenize("'open").unwrap_err(),
        FormulaError::UnterminatedString(0)
    );
    assert_eq!(
        tokenize("1.2.3").unwrap_err(),
        FormulaError::InvalidNumber("1.2.3".to_string())
    );
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(eval_empty("1 + 2 * 3"), Value::Number(7.0));
    assert_eq!(eval_empty("(1 + 2) * 3"), Value::Number(9.0));
    assert_eq!(eval_empty("10 - 4 - 3"), Value::Number(3.0));
    assert_eq!(eval_empty("7 % 4"), Value::Number(3.0));
    assert_eq!(eval_empty("-2 * -3"), Value::Number(6.0));
    assert_eq!(eval_empty("1 + 2 > 2 && 3 < 4"), Value::Bool(true));
}

#[test]
fn test_text_concatenation_and_comparison() {
    assert_eq!(eval_empty("'a' + 1"), Value::Text("a1".to_string()));
    assert_eq!(eval_empty("1 + 2 + 'x'"), Value::Text("3x".to_string()));
    assert_eq!(eval_empty("'b' > 'a'"), Value::Bool(true));
    assert_eq!(eval_empty("'10' > 9"), Value::Bool(true));
    assert_eq!(eval_empty("'2' == 2"), Value::Bool(true));
    assert_eq!(eval_empty("'2' === 2"), Value::Bool(false));
    assert_eq!(eval_empty("'2' !== '2'"), Value::Bool(false));
}

#[test]
fn test_logical_operators_return_operands() {
    let s = scope(&[
        ("field_nick", Value::Text(String::new())),
        ("field_name", Value::Text("Ada".to_string())),
    ]);
    assert_eq!(
        eval("field_nick || field_name", &s).unwrap(),
        Value::Text("Ada".to_string())
    );
    assert_eq!(
        eval("field_nick && field_name", &s).unwrap(),
        Value::Text(String::new())
    );
    assert_eq!(eval("!field_nick", &s).unwrap(), Value::Bool(true));
}

#[test]
fn test_short_circuit_skips_the_right_side() {
    // The right side would fail on an unbound variable if it ran.
    let s = scope(&[("field_a", Value::Bool(false))]);
    assert_eq!(eval("field_a && field_missing", &s).unwrap(), Value::Bool(false));
    assert!(eval("field_a || field_missing", &s).is_err());
}

#[test]
fn test_conditional() {
    let s = scope(&[("field_age", Value::Number(20.0))]);
    assert_eq!(
        eval("field_age >= 18 ? 'adult' : 'minor'", &s).unwrap(),
        Value::Text("adult".to_string())
    );
    assert_eq!(
        eval("field_age < 13 ? 'child' : field_age < 18 ? 'teen' : 'adult'", &s).unwrap(),
        Value::Text("adult".to_string())
    );
}

#[test]
fn test_builtins() {
    assert_eq!(eval_empty("abs(-3)"), Value::Number(3.0));
    assert_eq!(eval_empty("round(2.5)"), Value::Number(3.0));
    assert_eq!(eval_empty("round(-2.5)"), Value::Number(-2.0));
    assert_eq!(eval_empty("round(-2.6)"), Value::Number(-3.0));
    assert_eq!(eval_empty("round(0.49999999999999994)"), Value::Number(0.0));
    assert_eq!(eval_empty("floor(2.7)"), Value::Number(2.0));
    assert_eq!(eval_empty("ceil(2.1)"), Value::Number(3.0));
    assert_eq!(eval_empty("min(4, 2, 8)"), Value::Number(2.0));
    assert_eq!(eval_empty("max(4, '9', 8)"), Value::Number(9.0));
    assert_eq!(eval_empty("len('hello')"), Value::Number(5.0));
    assert_eq!(eval_empty("upper('abc')"), Value::Text("ABC".to_string()));
    assert_eq!(eval_empty("lower('ABC')"), Value::Text("abc".to_string()));
    assert_eq!(eval_empty("trim('  x ')"), Value::Text("x".to_string()));
}

#[test]
fn test_runtime_errors() {
    let s = scope(&[("field_name", Value::Text("Ada".to_string()))]);
    assert!(matches!(
        eval("field_name * 2", &s),
        Err(EvaluationError::TypeMismatch { .. })
    ));
    assert_eq!(
        eval("field_other", &s),
        Err(EvaluationError::InputNotFound("field_other".to_string()))
    );
    assert!(matches!(
        eval("1 / field_zero", &scope(&[("field_zero", Value::Number(0.0))])),
        Err(EvaluationError::NonFinite(_))
    ));
}

#[test]
fn test_compile_errors() {
    let compiler = FormulaCompiler::default();
    assert_eq!(compiler.compile("").unwrap_err(), FormulaError::Empty);
    assert_eq!(compiler.compile("   ").unwrap_err(), FormulaError::Empty);
    assert_eq!(
        compiler.compile("foo(1)").unwrap_err(),
        FormulaError::UnknownFunction("foo".to_string())
    );
    assert_eq!(
        compiler.compile("abs(1, 2)").unwrap_err(),
        FormulaError::WrongArity {
            name: "abs".to_string(),
            expected: "1".to_string(),
            found: 2
        }
    );
    assert!(matches!(
        compiler.compile("min()").unwrap_err(),
        FormulaError::WrongArity { found: 0, .. }
    ));
    assert!(matches!(
        compiler.compile("1 2").unwrap_err(),
        FormulaError::UnexpectedToken { position: 2, .. }
    ));
    assert_eq!(
        compiler.compile("(1 + 2").unwrap_err(),
        FormulaError::UnexpectedEnd("')'".to_string())
    );
    assert!(compiler.compile("a ? b").is_err());
}

#[test]
fn test_limits() {
    let compiler = FormulaCompiler::builder().max_length(10).max_depth(4).build();
    assert_eq!(
        compiler.compile("1 + 2 + 3 + 4").unwrap_err(),
        FormulaError::TooLong {
            length: 13,
            limit: 10
        }
    );
    assert_eq!(
        compiler.compile("((((1))))").unwrap_err(),
        FormulaError::TooDeep(4)
    );
    assert_eq!(compiler.compile("-----1").unwrap_err(), FormulaError::TooDeep(4));
    assert!(compiler.compile("((1))").is_ok());

    // Default limits accept ordinary formulas.
    let deep = format!("{}1{}", "(".repeat(32), ")".repeat(32));
    assert!(FormulaCompiler::default().compile(&deep).is_ok());
    let long = "1+".repeat(600) + "1";
    assert!(matches!(
        FormulaCompiler::default().compile(&long),
        Err(FormulaError::TooLong { .. })
    ));
}

#[test]
fn test_optimizer_folds_constants() {
    let formula = FormulaCompiler::default().compile("2 * 3 + field_x").unwrap();
    assert_eq!(
        formula.ast(),
        &Expression::binary(
            BinaryOp::Add,
            Expression::Literal(Value::Number(6.0)),
            Expression::variable("field_x"),
        )
    );

    let formula = FormulaCompiler::default()
        .compile("true ? upper('a') : field_x")
        .unwrap();
    assert_eq!(formula.ast(), &Expression::Literal(Value::Text("A".to_string())));

    // Folding never turns a runtime error into a compile-time one.
    let formula = FormulaCompiler::default().compile("1 / 0").unwrap();
    assert!(formula.evaluate_value(&Scope::new()).is_err());

    let raw = FormulaCompiler::builder()
        .without_optimizer()
        .build()
        .compile("abs(-1)")
        .unwrap();
    assert!(matches!(
        raw.ast(),
        Expression::Call {
            function: Builtin::Abs,
            ..
        }
    ));
}

#[test]
fn test_variables() {
    let formula = FormulaCompiler::default()
        .compile("field_a + max(field_b, 1) || field_a")
        .unwrap();
    let mut names: Vec<String> = formula.variables().into_iter().collect();
    names.sort();
    assert_eq!(names, vec!["field_a", "field_b"]);
    assert_eq!(formula.source(), "field_a + max(field_b, 1) || field_a");
}

#[test]
fn test_trace_explains_evaluation() {
    let formula = FormulaCompiler::default()
        .compile("(field_a - field_b) * 2 > 10 || field_name")
        .unwrap();
    let s = scope(&[
        ("field_a", Value::Number(9.0)),
        ("field_b", Value::Number(1.0)),
        ("field_name", Value::Text("n/a".to_string())),
    ]);
    let trace = formula.evaluate(&s).unwrap();
    assert_eq!(trace.get_outcome(), Value::Bool(true));
    assert_eq!(
        TraceFormatter::format_trace(&trace),
        "(field_a (was 9) - field_b (was 1)) * 2 > 10"
    );
}
