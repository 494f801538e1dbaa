use crate::ast::{EvaluationTrace, Value};

/// Formats evaluation traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format an evaluation trace into a human-readable explanation.
    pub fn format_trace(trace: &EvaluationTrace) -> String {
        Self::format_recursive(trace, 0)
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &EvaluationTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let mut result = String::new();
        if needs_parens {
            result.push('(');
        }

        match trace {
            EvaluationTrace::BinaryOp {
                op_symbol,
                left,
                right,
                ..
            } => {
                let left_str = Self::format_recursive(left, current_precedence);

                // A short-circuited operator is explained by its left side alone.
                if !matches!(**right, EvaluationTrace::NotEvaluated) {
                    // Right operands bind one level tighter so `a - (b - c)` keeps its parens.
                    let right_str = Self::format_recursive(right, current_precedence + 1);
                    result.push_str(&format!("{} {} {}", left_str, op_symbol, right_str));
                } else {
                    result.push_str(&left_str);
                }
            }
            EvaluationTrace::UnaryOp {
                op_symbol, child, ..
            } => {
                let child_str = Self::format_recursive(child, current_precedence);
                result.push_str(&format!("{}{}", op_symbol, child_str));
            }
            EvaluationTrace::Conditional {
                condition, branch, ..
            } => {
                let condition_str = Self::format_recursive(condition, current_precedence + 1);
                let branch_str = Self::format_recursive(branch, current_precedence);
                result.push_str(&format!("{} ? {}", condition_str, branch_str));
            }
            EvaluationTrace::Call { name, args, .. } => {
                let args_str = args
                    .iter()
                    .map(|arg| Self::format_recursive(arg, 0))
                    .collect::<Vec<_>>()
                    .join(", ");
                result.push_str(&format!("{}({})", name, args_str));
            }
            EvaluationTrace::Leaf { source, value } => {
                if source.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '$')
                    && !matches!(source.as_str(), "true" | "false" | "null")
                {
                    result.push_str(&format!("{} (was {})", source, Self::format_value(value)));
                } else {
                    result.push_str(source);
                }
            }
            EvaluationTrace::NotEvaluated => {}
        }

        if needs_parens {
            result.push(')');
        }
        result
    }

    /// Format a value for display; text is quoted so blanks stay visible.
    fn format_value(value: &Value) -> String {
        match value {
            Value::Text(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}
