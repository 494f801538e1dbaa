//! The derived value engine.
//!
//! A derived field's value is a pure function of its parents' values. Any
//! failure along the way (an unparseable date, a formula that does not
//! compile or throws) produces the empty-string sentinel instead of an error,
//! so callers must not read a present value as proof that derivation succeeded.

use crate::config::EngineConfig;
use crate::formula::{Formula, FormulaCompiler};
use crate::interpreter::Scope;
use crate::schema::{DerivationKind, DerivedFieldSpec, FieldValue, ValuesMap};
use chrono::{Datelike, Local, NaiveDate};
use itertools::Itertools;
use tracing::debug;

mod graph;

pub use graph::{CompiledDerivation, DerivationPlan};

/// Computes a derived value as of today, with the default configuration.
pub fn compute_derived(spec: &DerivedFieldSpec, values: &ValuesMap) -> FieldValue {
    compute_derived_at(spec, values, today())
}

/// Computes a derived value as of `today`, with the default configuration.
pub fn compute_derived_at(spec: &DerivedFieldSpec, values: &ValuesMap, today: NaiveDate) -> FieldValue {
    compute_derived_with(spec, values, &EngineConfig::default(), today)
}

/// Computes a derived value, compiling a custom formula on the spot.
pub fn compute_derived_with(
    spec: &DerivedFieldSpec,
    values: &ValuesMap,
    config: &EngineConfig,
    today: NaiveDate,
) -> FieldValue {
    if spec.kind != DerivationKind::Custom {
        return compute_builtin(spec, values, today);
    }
    match FormulaCompiler::new(config.formula).compile(&spec.formula) {
        Ok(formula) => evaluate_custom(&formula, spec, values, config),
        Err(e) => {
            debug!(formula = %spec.formula, error = %e, "custom formula failed to compile");
            FieldValue::text("")
        }
    }
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The value of a parent field, or the empty string when it has none.
fn parent_value(values: &ValuesMap, id: &str) -> FieldValue {
    match values.get(id) {
        Some(FieldValue::Empty) | None => FieldValue::text(""),
        Some(value) => value.clone(),
    }
}

/// Derives `age`, `sum` and `concat` fields; anything else yields the empty string.
pub(crate) fn compute_builtin(
    spec: &DerivedFieldSpec,
    values: &ValuesMap,
    today: NaiveDate,
) -> FieldValue {
    let parents = spec
        .parent_field_ids
        .iter()
        .map(|id| parent_value(values, id));

    match &spec.kind {
        DerivationKind::Age => {
            let birth_date = spec
                .parent_field_ids
                .first()
                .map(|id| parent_value(values, id))
                .and_then(|v| v.as_date());
            match birth_date {
                Some(birth_date) => FieldValue::Number(age_on(birth_date, today) as f64),
                None => FieldValue::text(""),
            }
        }
        DerivationKind::Sum => FieldValue::Number(
            parents
                .map(|v| parse_float_prefix(&v.to_string()).unwrap_or(0.0))
                .sum(),
        ),
        DerivationKind::Concat => FieldValue::Text(parents.filter(|v| v.is_truthy()).join(" ")),
        DerivationKind::Custom | DerivationKind::Unknown(_) => FieldValue::text(""),
    }
}

/// Whole years from `birth_date` to `today`, counting a year only once its birthday has passed.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let before_birthday = today.month() < birth_date.month()
        || (today.month() == birth_date.month() && today.day() < birth_date.day());
    today.year() - birth_date.year() - i32::from(before_birthday)
}

/// Binds every parent of `spec` into a formula scope under its variable name.
pub fn bind_parents(spec: &DerivedFieldSpec, values: &ValuesMap, config: &EngineConfig) -> Scope {
    spec.parent_field_ids
        .iter()
        .map(|id| {
            (
                config.variable_name(id),
                parent_value(values, id).to_formula_value(),
            )
        })
        .collect()
}

/// Runs a compiled custom formula; evaluation errors become the empty string.
pub(crate) fn evaluate_custom(
    formula: &Formula,
    spec: &DerivedFieldSpec,
    values: &ValuesMap,
    config: &EngineConfig,
) -> FieldValue {
    let scope = bind_parents(spec, values, config);
    match formula.evaluate_value(&scope) {
        Ok(value) => FieldValue::from_formula_value(value),
        Err(e) => {
            debug!(formula = %formula.source(), error = %e, "custom formula failed to evaluate");
            FieldValue::text("")
        }
    }
}

/// Parses the longest leading decimal number in `s`, ignoring leading whitespace.
///
/// `"4.5kg"` reads as `4.5`, `"abc"` as nothing.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}
