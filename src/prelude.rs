//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the yoshiki crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use yoshiki::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = EngineConfig::from_file("path/to/config.json")?;
//! let library = FormLibrary::open(JsonFileStore::new("path/to/forms", &config))?;
//!
//! for form in library.list() {
//!     let session = PreviewSession::new(&form.fields, &config)?;
//!     if let Err(errors) = session.submit() {
//!         println!("'{}' is not valid with its defaults:\n{}", form.name, errors);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Form editing and filling in
pub use crate::builder::FormDraft;
pub use crate::preview::PreviewSession;

// Schema types
pub use crate::schema::{
    DerivationKind, DerivedFieldSpec, FieldKind, FieldOption, FieldValue, FormField, FormSchema,
    NewField, RuleKind, ValidationRule, ValuesMap,
};

// Engines
pub use crate::derived::{DerivationPlan, compute_derived, compute_derived_at};
pub use crate::formula::{Formula, FormulaCompiler};
pub use crate::validation::{ValidationErrors, evaluate as validate};

// AST and tracing
pub use crate::ast::{EvaluationTrace, Expression, Value};
pub use crate::trace::TraceFormatter;

// Configuration and persistence
pub use crate::config::EngineConfig;
pub use crate::store::{FormLibrary, FormRepository, JsonFileStore, MemoryStore};

// Error types
pub use crate::error::{
    ConfigError, EvaluationError, FormError, FormulaError, GraphError, StoreError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
