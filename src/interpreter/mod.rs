use crate::ast::{EvaluationTrace, Expression, Value};
use crate::error::EvaluationError;
use ahash::AHashMap;

mod engine;
pub(crate) mod ops;

use engine::AstEngine;

/// Variable bindings visible to a formula.
pub type Scope = AHashMap<String, Value>;

/// Walks a compiled formula against a scope.
///
/// The interpreter only ever reads from the scope and calls whitelisted
/// builtins; a formula has no way to reach anything outside its inputs.
pub struct Interpreter;

impl Interpreter {
    /// Evaluates `ast`, returning the full trace of intermediate values.
    pub fn evaluate(ast: &Expression, scope: &Scope) -> Result<EvaluationTrace, EvaluationError> {
        AstEngine::new(ast, scope).evaluate()
    }

    /// Evaluates `ast` and returns only its outcome.
    pub fn evaluate_value(ast: &Expression, scope: &Scope) -> Result<Value, EvaluationError> {
        Self::evaluate(ast, scope).map(|trace| trace.get_outcome())
    }
}
