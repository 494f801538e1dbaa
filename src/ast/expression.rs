use super::{InputSource, Value};
use std::collections::HashSet;
use std::fmt;

/// Binary operators with both operands always evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    SmallerThan,
    SmallerThanOrEqual,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanOrEqual => ">=",
            BinaryOp::SmallerThan => "<",
            BinaryOp::SmallerThanOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        }
    }
}

/// The whitelisted functions a formula may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Round,
    Floor,
    Ceil,
    Min,
    Max,
    Len,
    Upper,
    Lower,
    Trim,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Builtin::Abs,
            "round" => Builtin::Round,
            "floor" => Builtin::Floor,
            "ceil" => Builtin::Ceil,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "len" => Builtin::Len,
            "upper" => Builtin::Upper,
            "lower" => Builtin::Lower,
            "trim" => Builtin::Trim,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Round => "round",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Len => "len",
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Trim => "trim",
        }
    }

    /// Accepted argument count as `(min, max)`; `None` means unbounded.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Builtin::Min | Builtin::Max => (1, None),
            _ => (1, Some(1)),
        }
    }
}

/// The Abstract Syntax Tree of a compiled formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    // Short-circuiting; both return the deciding operand rather than a bool.
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),

    Conditional {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    Call {
        function: Builtin,
        args: Vec<Expression>,
    },

    // Leaf nodes
    Literal(Value),
    Input(InputSource),
}

impl Expression {
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn variable(name: &str) -> Self {
        Expression::Input(InputSource {
            name: name.to_string(),
        })
    }

    /// Collects every variable name the expression reads.
    pub fn referenced_variables(&self, names: &mut HashSet<String>) {
        match self {
            Expression::Input(source) => {
                names.insert(source.name.clone());
            }
            Expression::Binary { left, right, .. }
            | Expression::And(left, right)
            | Expression::Or(left, right) => {
                left.referenced_variables(names);
                right.referenced_variables(names);
            }
            Expression::Unary { operand, .. } => operand.referenced_variables(names),
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => {
                condition.referenced_variables(names);
                then.referenced_variables(names);
                otherwise.referenced_variables(names);
            }
            Expression::Call { args, .. } => {
                for arg in args {
                    arg.referenced_variables(names);
                }
            }
            Expression::Literal(_) => {}
        }
    }
}

/// Displays an expression as an indented tree, for inspecting compiled formulas.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        &self,
        expr: &Expression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match expr {
            Expression::Literal(Value::Text(s)) => writeln!(f, "Literal: {:?}", s)?,
            Expression::Literal(v) => writeln!(f, "Literal: {}", v)?,
            Expression::Input(s) => writeln!(f, "Input: {}", s)?,
            Expression::Unary { op, operand } => {
                writeln!(f, "Unary ({})", op.symbol())?;
                self.fmt_as_tree(operand, f, &child_prefix, true)?;
            }
            Expression::Binary { op, left, right } => {
                self.fmt_children(f, &format!("Binary ({})", op.symbol()), &[left, right], &child_prefix)?
            }
            Expression::And(l, r) => self.fmt_children(f, "And (&&)", &[l, r], &child_prefix)?,
            Expression::Or(l, r) => self.fmt_children(f, "Or (||)", &[l, r], &child_prefix)?,
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => self.fmt_children(
                f,
                "Conditional (?:)",
                &[condition, then, otherwise],
                &child_prefix,
            )?,
            Expression::Call { function, args } => {
                writeln!(f, "Call: {}()", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    self.fmt_as_tree(arg, f, &child_prefix, i + 1 == args.len())?;
                }
            }
        }
        Ok(())
    }

    fn fmt_children(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        children: &[&Box<Expression>],
        prefix: &str,
    ) -> fmt::Result {
        writeln!(f, "{}", name)?;
        for (i, child) in children.iter().enumerate() {
            self.fmt_as_tree(child, f, prefix, i + 1 == children.len())?;
        }
        Ok(())
    }
}
