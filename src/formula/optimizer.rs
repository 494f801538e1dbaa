use crate::ast::{Expression, Value};
use crate::interpreter::ops;

/// Folds constant sub-expressions of a parsed formula.
///
/// Folding reuses the interpreter's operator semantics, so an optimized
/// formula always evaluates to the same result as the unoptimized one.
/// Operations that would fail at runtime are left in place.
pub struct AstOptimizer;

impl AstOptimizer {
    /// Folds bottom-up, so a single pass reaches the fixed point.
    pub fn optimize(expr: Expression) -> Expression {
        Self::fold(expr)
    }

    fn fold(expr: Expression) -> Expression {
        match expr {
            Expression::Binary { op, left, right } => {
                let left = Self::fold(*left);
                let right = Self::fold(*right);
                if let (Expression::Literal(lv), Expression::Literal(rv)) = (&left, &right) {
                    if let Ok(value) = ops::apply_binary(op, lv, rv) {
                        return Expression::Literal(value);
                    }
                }
                Expression::binary(op, left, right)
            }
            Expression::Unary { op, operand } => {
                let operand = Self::fold(*operand);
                if let Expression::Literal(v) = &operand {
                    if let Ok(value) = ops::apply_unary(op, v) {
                        return Expression::Literal(value);
                    }
                }
                Expression::unary(op, operand)
            }
            Expression::And(l, r) => match Self::fold(*l) {
                Expression::Literal(v) if !v.is_truthy() => Expression::Literal(v),
                Expression::Literal(_) => Self::fold(*r),
                left => Expression::And(Box::new(left), Box::new(Self::fold(*r))),
            },
            Expression::Or(l, r) => match Self::fold(*l) {
                Expression::Literal(v) if v.is_truthy() => Expression::Literal(v),
                Expression::Literal(_) => Self::fold(*r),
                left => Expression::Or(Box::new(left), Box::new(Self::fold(*r))),
            },
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => match Self::fold(*condition) {
                Expression::Literal(v) if v.is_truthy() => Self::fold(*then),
                Expression::Literal(_) => Self::fold(*otherwise),
                condition => Expression::Conditional {
                    condition: Box::new(condition),
                    then: Box::new(Self::fold(*then)),
                    otherwise: Box::new(Self::fold(*otherwise)),
                },
            },
            Expression::Call { function, args } => {
                let args: Vec<Expression> = args.into_iter().map(Self::fold).collect();
                let literals: Option<Vec<Value>> = args
                    .iter()
                    .map(|arg| match arg {
                        Expression::Literal(v) => Some(v.clone()),
                        _ => None,
                    })
                    .collect();
                if let Some(values) = literals {
                    if let Ok(value) = ops::apply_builtin(function, &values) {
                        return Expression::Literal(value);
                    }
                }
                Expression::Call { function, args }
            }
            leaf @ (Expression::Literal(_) | Expression::Input(_)) => leaf,
        }
    }
}
