//! # Yoshiki - Form Schema, Validation and Derived-Field Engine
//!
//! **Yoshiki** models typed forms: fields of a fixed set of kinds, ordered
//! validation rules per field, and derived fields whose values are computed
//! from other fields. Custom derivations are written in a small sandboxed
//! formula language that is tokenized, parsed and evaluated in-process; it
//! can read its parent fields and call a handful of whitelisted functions,
//! nothing else.
//!
//! ## Core Workflow
//!
//! 1.  **Build a form**: Add fields to a [`FormDraft`](builder::FormDraft), reorder and edit them, then `save` a [`FormSchema`](schema::FormSchema).
//! 2.  **Persist it**: Store saved forms through a [`FormLibrary`](store::FormLibrary) backed by any [`FormRepository`](store::FormRepository).
//! 3.  **Fill it in**: Open a [`PreviewSession`](preview::PreviewSession). Every value change recomputes all derived fields in dependency order.
//! 4.  **Validate**: Check single fields as they change, or the whole form on `submit`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yoshiki::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = EngineConfig::default();
//!
//!     // 1. Assemble a form.
//!     let mut draft = FormDraft::new();
//!     draft.set_name("Signup");
//!     let first = draft.add_field(NewField::new(FieldKind::Text, "First name").required()
//!         .with_rule(ValidationRule::required("First name is required")));
//!     let last = draft.add_field(NewField::new(FieldKind::Text, "Last name"));
//!     let full = draft.add_field(
//!         NewField::new(FieldKind::Text, "Full name")
//!             .derived(DerivedFieldSpec::new(DerivationKind::Concat, &[first.as_str(), last.as_str()])),
//!     );
//!
//!     // 2. Save it.
//!     let mut library = FormLibrary::open(JsonFileStore::new("forms", &config))?;
//!     let schema = draft.save()?;
//!     library.insert(schema.clone())?;
//!
//!     // 3. Fill it in.
//!     let mut session = PreviewSession::new(&schema.fields, &config)?;
//!     session.set_value(&first, FieldValue::text("Jane"))?;
//!     session.set_value(&last, FieldValue::text("Doe"))?;
//!     println!("Full name: {}", session.value(&full).cloned().unwrap_or_default());
//!
//!     // 4. Submit.
//!     match session.submit() {
//!         Ok(values) => println!("Submitted {} values", values.len()),
//!         Err(errors) => println!("Fix these first:\n{}", errors),
//!     }
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod builder;
pub mod config;
pub mod derived;
pub mod error;
pub mod formula;
pub mod interpreter;
pub mod prelude;
pub mod preview;
pub mod schema;
pub mod store;
pub mod trace;
pub mod validation;
