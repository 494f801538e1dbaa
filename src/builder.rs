use crate::error::FormError;
use crate::schema::{FormField, FormSchema, NewField};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// The in-progress form being edited.
///
/// Every mutation keeps `order` equal to each field's index in `fields`,
/// so display order and storage order never drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    name: String,
    fields: Vec<FormField>,
}

impl FormDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Fields sorted by display position.
    pub fn fields_in_order(&self) -> Vec<&FormField> {
        let mut fields: Vec<&FormField> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Appends a field with a fresh id and returns that id.
    pub fn add_field(&mut self, field: NewField) -> String {
        let id = Uuid::new_v4().to_string();
        let order = self.fields.len();
        debug!(field = %id, kind = ?field.kind, order, "adding field");
        self.fields.push(field.into_field(id.clone(), order));
        id
    }

    /// Applies `edit` to a field. The field's id and position cannot be changed this way.
    pub fn update_field<F>(&mut self, id: &str, edit: F) -> Result<(), FormError>
    where
        F: FnOnce(&mut FormField),
    {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FormError::FieldNotFound(id.to_string()))?;
        let (id, order) = (field.id.clone(), field.order);
        edit(field);
        field.id = id;
        field.order = order;
        field.is_derived = field.derived_field.is_some();
        Ok(())
    }

    /// Removes a field and closes the gap in `order`.
    pub fn delete_field(&mut self, id: &str) -> Result<FormField, FormError> {
        let index = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| FormError::FieldNotFound(id.to_string()))?;
        let removed = self.fields.remove(index);
        self.renumber();
        debug!(field = %id, "deleted field");
        Ok(removed)
    }

    /// Moves the field at `from` so that it ends up at index `to`.
    pub fn reorder_fields(&mut self, from: usize, to: usize) -> Result<(), FormError> {
        let len = self.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(FormError::IndexOutOfRange { index, len });
            }
        }
        let moved = self.fields.remove(from);
        self.fields.insert(to, moved);
        self.renumber();
        Ok(())
    }

    /// Snapshots the draft as a new saved form.
    pub fn save(&self) -> Result<FormSchema, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        let schema = FormSchema {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            fields: self.fields.clone(),
            created_at: Utc::now(),
        };
        info!(form = %schema.id, name = %schema.name, fields = schema.fields.len(), "saved form");
        Ok(schema)
    }

    /// Replaces the draft with a copy of a saved form.
    pub fn load(&mut self, schema: &FormSchema) {
        self.name = schema.name.clone();
        self.fields = schema.fields.clone();
        self.fields.sort_by_key(|f| f.order);
        self.renumber();
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.fields.clear();
    }

    fn renumber(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order = index;
        }
    }
}
