//! The formula language used by custom derived fields.
//!
//! Source text goes through three stages: [`lexer::tokenize`], a
//! recursive-descent parser, and the constant-folding [`AstOptimizer`].
//! The result is a [`Formula`] that can be evaluated any number of times
//! against different scopes.

use crate::ast::{EvaluationTrace, Expression, Value};
use crate::config::FormulaLimits;
use crate::error::{EvaluationError, FormulaError};
use crate::interpreter::{Interpreter, Scope};
use std::collections::HashSet;

pub mod lexer;
mod optimizer;
mod parser;

pub use optimizer::AstOptimizer;
use parser::Parser;

/// A compiled, ready-to-evaluate formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    ast: Expression,
}

impl Formula {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expression {
        &self.ast
    }

    /// Variables the formula reads; each must be bound in the scope it runs against.
    pub fn variables(&self) -> HashSet<String> {
        let mut names = HashSet::new();
        self.ast.referenced_variables(&mut names);
        names
    }

    pub fn evaluate(&self, scope: &Scope) -> Result<EvaluationTrace, EvaluationError> {
        Interpreter::evaluate(&self.ast, scope)
    }

    pub fn evaluate_value(&self, scope: &Scope) -> Result<Value, EvaluationError> {
        Interpreter::evaluate_value(&self.ast, scope)
    }
}

/// Compiles formula source text under a set of limits.
pub struct FormulaCompiler {
    limits: FormulaLimits,
    optimize: bool,
}

pub struct FormulaCompilerBuilder {
    limits: FormulaLimits,
    optimize: bool,
}

impl FormulaCompilerBuilder {
    pub fn new() -> Self {
        Self {
            limits: FormulaLimits::default(),
            optimize: true,
        }
    }
    pub fn with_limits(mut self, limits: FormulaLimits) -> Self {
        self.limits = limits;
        self
    }
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.limits.max_length = max_length;
        self
    }
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.limits.max_depth = max_depth;
        self
    }
    /// Disables constant folding, keeping the AST exactly as written.
    pub fn without_optimizer(mut self) -> Self {
        self.optimize = false;
        self
    }
    pub fn build(self) -> FormulaCompiler {
        FormulaCompiler {
            limits: self.limits,
            optimize: self.optimize,
        }
    }
}

impl Default for FormulaCompilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaCompiler {
    pub fn builder() -> FormulaCompilerBuilder {
        FormulaCompilerBuilder::new()
    }

    pub fn new(limits: FormulaLimits) -> Self {
        Self::builder().with_limits(limits).build()
    }

    pub fn compile(&self, source: &str) -> Result<Formula, FormulaError> {
        let length = source.chars().count();
        if length > self.limits.max_length {
            return Err(FormulaError::TooLong {
                length,
                limit: self.limits.max_length,
            });
        }

        let tokens = lexer::tokenize(source)?;
        let ast = Parser::new(&tokens, self.limits.max_depth).parse()?;
        let ast = if self.optimize {
            AstOptimizer::optimize(ast)
        } else {
            ast
        };

        Ok(Formula {
            source: source.to_string(),
            ast,
        })
    }
}

impl Default for FormulaCompiler {
    fn default() -> Self {
        Self::builder().build()
    }
}
