//! Common test utilities for building fields, forms and value maps.
use chrono::NaiveDate;
use yoshiki::prelude::*;

/// Creates a plain input field with a fixed id.
#[allow(dead_code)]
pub fn input_field(id: &str, kind: FieldKind, order: usize) -> FormField {
    FormField {
        id: id.to_string(),
        kind,
        label: id.to_string(),
        required: false,
        default_value: None,
        validation_rules: Vec::new(),
        options: None,
        is_derived: false,
        derived_field: None,
        order,
    }
}

/// Creates a derived field with a fixed id.
#[allow(dead_code)]
pub fn derived_field(id: &str, spec: DerivedFieldSpec, order: usize) -> FormField {
    FormField {
        is_derived: true,
        derived_field: Some(spec),
        ..input_field(id, FieldKind::Text, order)
    }
}

/// Builds a values map from `(field id, value)` pairs.
#[allow(dead_code)]
pub fn values(pairs: &[(&str, FieldValue)]) -> ValuesMap {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), value.clone()))
        .collect()
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A form whose derived fields chain: `total = price + tax`, `label = concat(name, total)`.
///
/// `label` is listed before `total` so evaluation order has to differ from display order.
#[allow(dead_code)]
pub fn create_chained_fields() -> Vec<FormField> {
    vec![
        input_field("name", FieldKind::Text, 0),
        input_field("price", FieldKind::Number, 1),
        input_field("tax", FieldKind::Number, 2),
        derived_field(
            "label",
            DerivedFieldSpec::new(DerivationKind::Concat, &["name", "total"]),
            3,
        ),
        derived_field(
            "total",
            DerivedFieldSpec::new(DerivationKind::Sum, &["price", "tax"]),
            4,
        ),
    ]
}

/// A signup form as stored by the builder.
#[allow(dead_code)]
pub const SIGNUP_FORM_JSON: &str = r#"{
    "id": "form-1",
    "name": "Signup",
    "createdAt": "2024-03-01T10:00:00Z",
    "fields": [
        {
            "id": "email",
            "type": "text",
            "label": "Email",
            "required": true,
            "validationRules": [
                { "type": "required", "message": "Email is required" },
                { "type": "email", "message": "Enter a valid email" }
            ],
            "isDerived": false,
            "order": 0
        },
        {
            "id": "password",
            "type": "text",
            "label": "Password",
            "validationRules": [
                { "type": "minLength", "value": 4, "message": "Too short" },
                { "type": "customPassword", "message": "Needs 8 characters and a digit" }
            ],
            "order": 1
        },
        {
            "id": "birth",
            "type": "date",
            "label": "Date of birth",
            "defaultValue": "1990-06-15",
            "order": 2
        },
        {
            "id": "age",
            "type": "number",
            "label": "Age",
            "isDerived": true,
            "derivedField": { "parentFieldIds": ["birth"], "type": "age" },
            "order": 3
        },
        {
            "id": "plan",
            "type": "select",
            "label": "Plan",
            "options": [
                { "value": "free", "label": "Free" },
                { "value": "pro", "label": "Pro" }
            ],
            "defaultValue": "free",
            "order": 4
        }
    ]
}"#;

#[allow(dead_code)]
pub fn signup_form() -> FormSchema {
    serde_json::from_str(SIGNUP_FORM_JSON).unwrap()
}
