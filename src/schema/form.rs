use super::FormField;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved, named snapshot of a field list. Never edited in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    pub fields: Vec<FormField>,
    pub created_at: DateTime<Utc>,
}

impl FormSchema {
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Fields sorted by display position.
    pub fn fields_in_order(&self) -> Vec<&FormField> {
        let mut fields: Vec<&FormField> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    pub fn derived_count(&self) -> usize {
        self.fields.iter().filter(|f| f.derivation().is_some()).count()
    }
}
