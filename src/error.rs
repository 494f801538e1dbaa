use crate::ast::Value;
use thiserror::Error;

/// Errors that can occur while turning formula source text into an `Expression`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Unexpected token '{found}' at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        position: usize,
    },

    #[error("Formula ended unexpectedly, expected {0}")]
    UnexpectedEnd(String),

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{name}' takes {expected} argument(s), but received {found}")]
    WrongArity {
        name: String,
        expected: String,
        found: usize,
    },

    #[error("Formula is {length} characters long, the limit is {limit}")]
    TooLong { length: usize, limit: usize },

    #[error("Formula nests deeper than the limit of {0}")]
    TooDeep(usize),

    #[error("Formula is empty")]
    Empty,
}

/// Errors that can occur while evaluating a compiled formula.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error(
        "Type mismatch during operation '{operation}': expected {expected}, but found value '{found}'"
    )]
    TypeMismatch {
        operation: String,
        expected: String,
        found: Value,
    },

    #[error("Variable '{0}' is not defined")]
    InputNotFound(String),

    #[error("Operation '{0}' produced a non-finite number")]
    NonFinite(String),
}

/// Structural problems in the derived-field dependency graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Derived fields form a cycle: {}", fields.join(" -> "))]
    Cycle { fields: Vec<String> },

    #[error("Formula of '{field}' binds parents '{first}' and '{second}' to the same variable '{variable}'")]
    AmbiguousVariable {
        field: String,
        variable: String,
        first: String,
        second: String,
    },
}

/// Errors raised by draft-form mutations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Field '{0}' does not exist in the form")]
    FieldNotFound(String),

    #[error("Index {index} is out of range for a form with {len} field(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("A form needs a non-blank name before it can be saved")]
    EmptyName,
}

/// Errors raised by form repositories.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not access storage at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Stored forms under key '{key}' are malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize forms: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Form '{0}' not found")]
    FormNotFound(String),
}

/// Errors raised while loading an `EngineConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file '{path}' is invalid: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
