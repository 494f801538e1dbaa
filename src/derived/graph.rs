use super::{compute_builtin, evaluate_custom, today};
use crate::ast::EvaluationTrace;
use crate::config::EngineConfig;
use crate::error::{EvaluationError, FormulaError, GraphError};
use crate::formula::{Formula, FormulaCompiler};
use crate::schema::{DerivationKind, DerivedFieldSpec, FieldValue, FormField, ValuesMap};
use ahash::{AHashMap, AHashSet};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// A derived field with its formula compiled ahead of time.
#[derive(Debug, Clone)]
pub struct CompiledDerivation {
    pub field_id: String,
    pub spec: DerivedFieldSpec,
    /// Present only for custom derivations.
    pub formula: Option<Result<Formula, FormulaError>>,
}

/// Evaluation order for every derived field of a form.
///
/// Built once per change to the form's structure. Derived fields may depend
/// on other derived fields; the plan evaluates parents first and refuses to
/// build when the dependencies form a cycle.
#[derive(Debug, Clone)]
pub struct DerivationPlan {
    steps: Vec<CompiledDerivation>,
    config: EngineConfig,
}

impl DerivationPlan {
    pub fn build(fields: &[FormField], config: &EngineConfig) -> Result<Self, GraphError> {
        let mut derived: Vec<(&FormField, &DerivedFieldSpec)> = fields
            .iter()
            .filter_map(|f| f.derivation().map(|spec| (f, spec)))
            .collect();
        derived.sort_by_key(|(f, _)| f.order);

        let known_ids: AHashSet<&str> = fields.iter().map(|f| f.id.as_str()).collect();
        let index_of: AHashMap<&str, usize> = derived
            .iter()
            .enumerate()
            .map(|(i, (f, _))| (f.id.as_str(), i))
            .collect();

        for (field, spec) in &derived {
            if spec.kind == DerivationKind::Custom {
                check_variable_names(field, spec, config)?;
            }
        }

        // parents_of[i] lists the derived fields node i reads from.
        let mut parents_of: Vec<Vec<usize>> = vec![Vec::new(); derived.len()];
        let mut dependents_of: Vec<Vec<usize>> = vec![Vec::new(); derived.len()];
        for (i, (field, spec)) in derived.iter().enumerate() {
            for parent_id in &spec.parent_field_ids {
                if let Some(&p) = index_of.get(parent_id.as_str()) {
                    parents_of[i].push(p);
                    dependents_of[p].push(i);
                } else if !known_ids.contains(parent_id.as_str()) {
                    warn!(field = %field.id, parent = %parent_id, "derived field references an unknown parent");
                }
            }
        }

        // Kahn's algorithm; among ready nodes the one shown first goes first.
        let mut in_degree: Vec<usize> = parents_of.iter().map(Vec::len).collect();
        let mut ready: BTreeSet<usize> = (0..derived.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(derived.len());
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &d in &dependents_of[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() < derived.len() {
            let remaining: BTreeSet<usize> =
                (0..derived.len()).filter(|&i| in_degree[i] > 0).collect();
            let fields = find_cycle(&remaining, &parents_of)
                .into_iter()
                .map(|i| derived[i].0.id.clone())
                .collect();
            return Err(GraphError::Cycle { fields });
        }

        let compiler = FormulaCompiler::new(config.formula);
        let steps = order
            .into_iter()
            .map(|i| {
                let (field, spec) = derived[i];
                let formula = (spec.kind == DerivationKind::Custom).then(|| {
                    let compiled = compiler.compile(&spec.formula);
                    match &compiled {
                        Ok(formula) => warn_unbound_variables(field, spec, formula, config),
                        Err(e) => debug!(field = %field.id, error = %e, "custom formula failed to compile"),
                    }
                    compiled
                });
                CompiledDerivation {
                    field_id: field.id.clone(),
                    spec: spec.clone(),
                    formula,
                }
            })
            .collect();

        Ok(Self {
            steps,
            config: config.clone(),
        })
    }

    /// Recomputes every derived field as of today.
    pub fn recompute(&self, values: &mut ValuesMap) {
        self.recompute_at(values, today());
    }

    /// Recomputes every derived field in dependency order, writing results into `values`.
    pub fn recompute_at(&self, values: &mut ValuesMap, today: NaiveDate) {
        for step in &self.steps {
            let value = match &step.formula {
                Some(Ok(formula)) => evaluate_custom(formula, &step.spec, values, &self.config),
                Some(Err(_)) => FieldValue::text(""),
                None => compute_builtin(&step.spec, values, today),
            };
            debug!(field = %step.field_id, value = %value, "recomputed derived field");
            values.insert(step.field_id.clone(), value);
        }
    }

    /// Derived field ids in evaluation order.
    pub fn order(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.field_id.as_str())
    }

    pub fn steps(&self) -> &[CompiledDerivation] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Custom formulas that failed to compile, in evaluation order.
    pub fn formula_errors(&self) -> Vec<(&str, &FormulaError)> {
        self.steps
            .iter()
            .filter_map(|s| match &s.formula {
                Some(Err(e)) => Some((s.field_id.as_str(), e)),
                _ => None,
            })
            .collect()
    }

    /// Evaluates the custom formula of `field_id` against `values` and returns its trace.
    ///
    /// `None` when the field is not a custom derived field of this plan.
    pub fn explain(
        &self,
        field_id: &str,
        values: &ValuesMap,
    ) -> Option<Result<EvaluationTrace, EvaluationError>> {
        let step = self.steps.iter().find(|s| s.field_id == field_id)?;
        let formula = step.formula.as_ref()?.as_ref().ok()?;
        let scope = super::bind_parents(&step.spec, values, &self.config);
        Some(formula.evaluate(&scope))
    }
}

/// Follows parent links inside the unresolved nodes until one repeats, and
/// returns that loop in dependency order with its first node repeated at the end.
fn find_cycle(remaining: &BTreeSet<usize>, parents_of: &[Vec<usize>]) -> Vec<usize> {
    let Some(&start) = remaining.first() else {
        return Vec::new();
    };
    let mut path = vec![start];
    let mut position: AHashMap<usize, usize> = AHashMap::from_iter([(start, 0)]);
    let mut current = start;

    loop {
        let Some(&next) = parents_of[current].iter().find(|p| remaining.contains(*p)) else {
            return path;
        };
        if let Some(&pos) = position.get(&next) {
            let mut cycle = path.split_off(pos);
            cycle.reverse();
            cycle.push(cycle[0]);
            return cycle;
        }
        position.insert(next, path.len());
        path.push(next);
        current = next;
    }
}

/// Distinct parent ids must not sanitize to the same formula variable.
fn check_variable_names(
    field: &FormField,
    spec: &DerivedFieldSpec,
    config: &EngineConfig,
) -> Result<(), GraphError> {
    let mut seen: AHashMap<String, &str> = AHashMap::new();
    for parent_id in &spec.parent_field_ids {
        let variable = config.variable_name(parent_id);
        match seen.get(&variable) {
            Some(&first) if first != parent_id.as_str() => {
                return Err(GraphError::AmbiguousVariable {
                    field: field.id.clone(),
                    variable,
                    first: first.to_string(),
                    second: parent_id.clone(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(variable, parent_id.as_str());
            }
        }
    }
    Ok(())
}

fn warn_unbound_variables(
    field: &FormField,
    spec: &DerivedFieldSpec,
    formula: &Formula,
    config: &EngineConfig,
) {
    let bound: AHashSet<String> = spec
        .parent_field_ids
        .iter()
        .map(|id| config.variable_name(id))
        .collect();
    for name in formula.variables() {
        if !bound.contains(&name) {
            warn!(field = %field.id, variable = %name, "formula reads a variable no parent provides");
        }
    }
}
