use crate::ast::{BinaryOp, Builtin, UnaryOp, Value};
use crate::error::EvaluationError;

/// Applies a strict (non short-circuiting) binary operator.
pub(crate) fn apply_binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvaluationError> {
    let symbol = op.symbol();
    match op {
        BinaryOp::Add => {
            if matches!(l, Value::Text(_)) || matches!(r, Value::Text(_)) {
                Ok(Value::Text(format!("{}{}", l, r)))
            } else {
                arithmetic(symbol, l, r, |a, b| a + b)
            }
        }
        BinaryOp::Subtract => arithmetic(symbol, l, r, |a, b| a - b),
        BinaryOp::Multiply => arithmetic(symbol, l, r, |a, b| a * b),
        BinaryOp::Divide => arithmetic(symbol, l, r, |a, b| a / b),
        BinaryOp::Remainder => arithmetic(symbol, l, r, |a, b| a % b),
        BinaryOp::Equal => Ok(Value::Bool(l.loose_eq(r))),
        BinaryOp::NotEqual => Ok(Value::Bool(!l.loose_eq(r))),
        BinaryOp::StrictEqual => Ok(Value::Bool(l.strict_eq(r))),
        BinaryOp::StrictNotEqual => Ok(Value::Bool(!l.strict_eq(r))),
        BinaryOp::GreaterThan => comparison(symbol, l, r, |a, b| a > b, |a, b| a > b),
        BinaryOp::GreaterThanOrEqual => comparison(symbol, l, r, |a, b| a >= b, |a, b| a >= b),
        BinaryOp::SmallerThan => comparison(symbol, l, r, |a, b| a < b, |a, b| a < b),
        BinaryOp::SmallerThanOrEqual => comparison(symbol, l, r, |a, b| a <= b, |a, b| a <= b),
    }
}

pub(crate) fn apply_unary(op: UnaryOp, v: &Value) -> Result<Value, EvaluationError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!v.is_truthy())),
        UnaryOp::Negate => finite(op.symbol(), Value::Number(-number(op.symbol(), v)?)),
        UnaryOp::Plus => finite(op.symbol(), Value::Number(number(op.symbol(), v)?)),
    }
}

pub(crate) fn apply_builtin(function: Builtin, args: &[Value]) -> Result<Value, EvaluationError> {
    let name = function.name();
    let first = args.first().unwrap_or(&Value::Null);
    let result = match function {
        Builtin::Abs => Value::Number(number(name, first)?.abs()),
        Builtin::Floor => Value::Number(number(name, first)?.floor()),
        Builtin::Ceil => Value::Number(number(name, first)?.ceil()),
        Builtin::Round => Value::Number(round_half_up(number(name, first)?)),
        Builtin::Min => Value::Number(fold_numbers(name, args, f64::min)?),
        Builtin::Max => Value::Number(fold_numbers(name, args, f64::max)?),
        Builtin::Len => Value::Number(first.to_string().encode_utf16().count() as f64),
        Builtin::Upper => Value::Text(first.to_string().to_uppercase()),
        Builtin::Lower => Value::Text(first.to_string().to_lowercase()),
        Builtin::Trim => Value::Text(first.to_string().trim().to_string()),
    };
    finite(name, result)
}

/// Rounds to the nearest integer; halves round towards positive infinity.
fn round_half_up(n: f64) -> f64 {
    let rounded = n.round();
    if n < 0.0 && rounded - n == -0.5 {
        rounded + 1.0
    } else {
        rounded
    }
}

fn fold_numbers(
    name: &str,
    args: &[Value],
    f: fn(f64, f64) -> f64,
) -> Result<f64, EvaluationError> {
    let mut numbers = args.iter().map(|v| number(name, v));
    let first = numbers.next().unwrap_or(Ok(f64::NAN))?;
    numbers.try_fold(first, |acc, n| n.map(|n| f(acc, n)))
}

fn arithmetic<F>(op: &str, l: &Value, r: &Value, f: F) -> Result<Value, EvaluationError>
where
    F: Fn(f64, f64) -> f64,
{
    let result = f(number(op, l)?, number(op, r)?);
    finite(op, Value::Number(result))
}

/// Compares two texts lexically, anything else numerically.
fn comparison<N, S>(op: &str, l: &Value, r: &Value, num: N, text: S) -> Result<Value, EvaluationError>
where
    N: Fn(f64, f64) -> bool,
    S: Fn(&str, &str) -> bool,
{
    match (l, r) {
        (Value::Text(a), Value::Text(b)) => Ok(Value::Bool(text(a.as_str(), b.as_str()))),
        _ => Ok(Value::Bool(num(number(op, l)?, number(op, r)?))),
    }
}

fn number(op: &str, v: &Value) -> Result<f64, EvaluationError> {
    v.to_number().ok_or_else(|| EvaluationError::TypeMismatch {
        operation: op.to_string(),
        expected: "Number".to_string(),
        found: v.clone(),
    })
}

fn finite(op: &str, value: Value) -> Result<Value, EvaluationError> {
    match value {
        Value::Number(n) if !n.is_finite() => Err(EvaluationError::NonFinite(op.to_string())),
        other => Ok(other),
    }
}
