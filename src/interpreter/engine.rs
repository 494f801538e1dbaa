use super::ops;
use crate::ast::{EvaluationTrace, Expression, Value};
use crate::error::EvaluationError;
use ahash::AHashMap;

/// The core recursive engine for evaluating a single formula AST against a scope.
pub(super) struct AstEngine<'a> {
    expression: &'a Expression,
    scope: &'a AHashMap<String, Value>,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(expression: &'a Expression, scope: &'a AHashMap<String, Value>) -> Self {
        Self { expression, scope }
    }

    /// Evaluates the AST and returns a trace of the execution.
    pub(super) fn evaluate(&self) -> Result<EvaluationTrace, EvaluationError> {
        self.evaluate_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Result<EvaluationTrace, EvaluationError> {
        match expr {
            Expression::Binary { op, left, right } => {
                let left_trace = self.evaluate_recursive(left)?;
                let right_trace = self.evaluate_recursive(right)?;
                let outcome =
                    ops::apply_binary(*op, &left_trace.get_outcome(), &right_trace.get_outcome())?;
                Ok(EvaluationTrace::BinaryOp {
                    op_symbol: op.symbol(),
                    left: Box::new(left_trace),
                    right: Box::new(right_trace),
                    outcome,
                })
            }
            Expression::Unary { op, operand } => {
                let child_trace = self.evaluate_recursive(operand)?;
                let outcome = ops::apply_unary(*op, &child_trace.get_outcome())?;
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: op.symbol(),
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            // --- Logical Operations ---
            Expression::And(l, r) => self.eval_short_circuit(l, r, "&&", false),
            Expression::Or(l, r) => self.eval_short_circuit(l, r, "||", true),

            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition_trace = self.evaluate_recursive(condition)?;
                let branch = if condition_trace.get_outcome().is_truthy() {
                    then
                } else {
                    otherwise
                };
                let branch_trace = self.evaluate_recursive(branch)?;
                let outcome = branch_trace.get_outcome();
                Ok(EvaluationTrace::Conditional {
                    condition: Box::new(condition_trace),
                    branch: Box::new(branch_trace),
                    outcome,
                })
            }
            Expression::Call { function, args } => {
                let arg_traces = args
                    .iter()
                    .map(|arg| self.evaluate_recursive(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                let values: Vec<Value> = arg_traces.iter().map(|t| t.get_outcome()).collect();
                let outcome = ops::apply_builtin(*function, &values)?;
                Ok(EvaluationTrace::Call {
                    name: function.name(),
                    args: arg_traces,
                    outcome,
                })
            }

            // --- Leaf Nodes ---
            Expression::Literal(val) => Ok(EvaluationTrace::Leaf {
                source: match val {
                    Value::Text(s) => format!("{:?}", s),
                    other => other.to_string(),
                },
                value: val.clone(),
            }),
            Expression::Input(source) => {
                let value = self
                    .scope
                    .get(&source.name)
                    .cloned()
                    .ok_or_else(|| EvaluationError::InputNotFound(source.name.clone()))?;
                Ok(EvaluationTrace::Leaf {
                    source: source.name.clone(),
                    value,
                })
            }
        }
    }

    /// `&&` stops on a falsy left operand and `||` on a truthy one; either way
    /// the deciding operand is the result.
    fn eval_short_circuit(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        stop_when: bool,
    ) -> Result<EvaluationTrace, EvaluationError> {
        let left_trace = self.evaluate_recursive(l)?;
        let left_value = left_trace.get_outcome();
        if left_value.is_truthy() == stop_when {
            return Ok(EvaluationTrace::BinaryOp {
                op_symbol: op,
                left: Box::new(left_trace),
                right: Box::new(EvaluationTrace::NotEvaluated),
                outcome: left_value,
            });
        }
        let right_trace = self.evaluate_recursive(r)?;
        let outcome = right_trace.get_outcome();
        Ok(EvaluationTrace::BinaryOp {
            op_symbol: op,
            left: Box::new(left_trace),
            right: Box::new(right_trace),
            outcome,
        })
    }
}
