use crate::config::EngineConfig;
use crate::derived::{self, DerivationPlan};
use crate::error::{FormError, GraphError};
use crate::schema::{FieldValue, FormField, ValuesMap};
use crate::trace::TraceFormatter;
use crate::validation::{self, ValidationErrors};
use chrono::NaiveDate;
use tracing::{debug, info};

/// A live fill-in of a form: current values, derived recomputation and validation.
pub struct PreviewSession {
    fields: Vec<FormField>,
    plan: DerivationPlan,
    values: ValuesMap,
    today: Option<NaiveDate>,
}

impl PreviewSession {
    /// Starts a session seeded with every field's default value.
    ///
    /// Fails when the form's derived fields depend on each other in a cycle.
    pub fn new(fields: &[FormField], config: &EngineConfig) -> Result<Self, GraphError> {
        let plan = DerivationPlan::build(fields, config)?;
        let mut fields = fields.to_vec();
        fields.sort_by_key(|f| f.order);

        let mut session = Self {
            fields,
            plan,
            values: ValuesMap::new(),
            today: None,
        };
        session.reset();
        Ok(session)
    }

    /// Pins the date `age` derivations are computed against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self.recompute();
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn plan(&self) -> &DerivationPlan {
        &self.plan
    }

    pub fn values(&self) -> &ValuesMap {
        &self.values
    }

    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    /// Records a new value for a field and recomputes every derived field.
    pub fn set_value(&mut self, field_id: &str, value: FieldValue) -> Result<(), FormError> {
        if !self.fields.iter().any(|f| f.id == field_id) {
            return Err(FormError::FieldNotFound(field_id.to_string()));
        }
        debug!(field = %field_id, value = %value, "preview value changed");
        self.values.insert(field_id.to_string(), value);
        self.recompute();
        Ok(())
    }

    /// Parses raw input text for a field according to its kind, then sets it.
    pub fn set_input(&mut self, field_id: &str, raw: &str) -> Result<(), FormError> {
        let kind = self
            .fields
            .iter()
            .find(|f| f.id == field_id)
            .map(|f| f.kind)
            .ok_or_else(|| FormError::FieldNotFound(field_id.to_string()))?;
        self.set_value(field_id, FieldValue::from_input(kind, raw))
    }

    /// Message of the first rule the field's current value fails.
    pub fn validate_field(&self, field_id: &str) -> Option<&str> {
        let field = self.fields.iter().find(|f| f.id == field_id)?;
        validation::validate_field(field, &self.values)
    }

    /// Validates every field; on success returns the values to submit.
    pub fn submit(&self) -> Result<&ValuesMap, ValidationErrors> {
        let errors = validation::validate_form(&self.fields, &self.values);
        if errors.is_empty() {
            info!(fields = self.values.len(), "form submitted");
            Ok(&self.values)
        } else {
            debug!(errors = errors.len(), "form submission rejected");
            Err(errors)
        }
    }

    /// Restores default values; fields without a default are cleared.
    pub fn reset(&mut self) {
        self.values = self
            .fields
            .iter()
            .filter_map(|f| f.default_value.clone().map(|v| (f.id.clone(), v)))
            .collect();
        self.recompute();
    }

    /// Human-readable account of how a custom derived field got its value.
    pub fn explain(&self, field_id: &str) -> Option<String> {
        match self.plan.explain(field_id, &self.values)? {
            Ok(trace) => Some(format!(
                "{} = {}",
                TraceFormatter::format_trace(&trace),
                trace.get_outcome()
            )),
            Err(e) => Some(format!("evaluation failed: {}", e)),
        }
    }

    fn recompute(&mut self) {
        let today = self.today.unwrap_or_else(derived::today);
        self.plan.recompute_at(&mut self.values, today);
    }
}
