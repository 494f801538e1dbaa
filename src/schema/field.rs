use super::FieldValue;
use serde::{Deserialize, Serialize};

/// The input control a field renders as, which also fixes the shape of its value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl FieldKind {
    /// Select and radio fields choose from a list of options.
    pub fn has_options(self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Radio)
    }
}

/// The predicate a validation rule applies.
///
/// Kinds this version does not know are kept by name and always pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Email,
    CustomPassword,
    Unknown(String),
}

impl From<String> for RuleKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "required" => RuleKind::Required,
            "minLength" => RuleKind::MinLength,
            "maxLength" => RuleKind::MaxLength,
            "email" => RuleKind::Email,
            "customPassword" => RuleKind::CustomPassword,
            _ => RuleKind::Unknown(name),
        }
    }
}

impl From<RuleKind> for String {
    fn from(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Required => "required".to_string(),
            RuleKind::MinLength => "minLength".to_string(),
            RuleKind::MaxLength => "maxLength".to_string(),
            RuleKind::Email => "email".to_string(),
            RuleKind::CustomPassword => "customPassword".to_string(),
            RuleKind::Unknown(name) => name,
        }
    }
}

/// A rule's argument, e.g. the limit of a `minLength` rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RuleParameter {
    Number(f64),
    Text(String),
}

impl RuleParameter {
    /// Numeric view; text is parsed, anything unparseable is `NaN`.
    pub fn as_number(&self) -> f64 {
        match self {
            RuleParameter::Number(n) => *n,
            RuleParameter::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

/// A named predicate plus the message shown when it fails.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<RuleParameter>,
    pub message: String,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, message: &str) -> Self {
        Self {
            kind,
            parameter: None,
            message: message.to_string(),
        }
    }

    pub fn with_parameter(mut self, parameter: f64) -> Self {
        self.parameter = Some(RuleParameter::Number(parameter));
        self
    }

    pub fn required(message: &str) -> Self {
        Self::new(RuleKind::Required, message)
    }

    pub fn min_length(length: usize, message: &str) -> Self {
        Self::new(RuleKind::MinLength, message).with_parameter(length as f64)
    }

    pub fn max_length(length: usize, message: &str) -> Self {
        Self::new(RuleKind::MaxLength, message).with_parameter(length as f64)
    }

    pub fn email(message: &str) -> Self {
        Self::new(RuleKind::Email, message)
    }

    pub fn custom_password(message: &str) -> Self {
        Self::new(RuleKind::CustomPassword, message)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

impl FieldOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// How a derived field computes its value from its parents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum DerivationKind {
    Age,
    Sum,
    Concat,
    Custom,
    Unknown(String),
}

impl From<String> for DerivationKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "age" => DerivationKind::Age,
            "sum" => DerivationKind::Sum,
            "concat" => DerivationKind::Concat,
            "custom" => DerivationKind::Custom,
            _ => DerivationKind::Unknown(name),
        }
    }
}

impl From<DerivationKind> for String {
    fn from(kind: DerivationKind) -> Self {
        match kind {
            DerivationKind::Age => "age".to_string(),
            DerivationKind::Sum => "sum".to_string(),
            DerivationKind::Concat => "concat".to_string(),
            DerivationKind::Custom => "custom".to_string(),
            DerivationKind::Unknown(name) => name,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFieldSpec {
    pub parent_field_ids: Vec<String>,
    #[serde(rename = "type")]
    pub kind: DerivationKind,
    /// Only read when `kind` is `Custom`.
    #[serde(default)]
    pub formula: String,
}

impl DerivedFieldSpec {
    pub fn new(kind: DerivationKind, parents: &[&str]) -> Self {
        Self {
            parent_field_ids: parents.iter().map(|p| p.to_string()).collect(),
            kind,
            formula: String::new(),
        }
    }

    pub fn custom(formula: &str, parents: &[&str]) -> Self {
        Self {
            formula: formula.to_string(),
            ..Self::new(DerivationKind::Custom, parents)
        }
    }
}

/// One input definition within a form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default)]
    pub is_derived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_field: Option<DerivedFieldSpec>,
    /// Display position; dense and 0-based across the form.
    pub order: usize,
}

impl FormField {
    /// The derivation descriptor, if the field is derived.
    pub fn derivation(&self) -> Option<&DerivedFieldSpec> {
        if self.is_derived {
            self.derived_field.as_ref()
        } else {
            None
        }
    }
}

/// Everything a new field needs except the id and position the draft assigns.
#[derive(Debug, Clone, PartialEq)]
pub struct NewField {
    pub kind: FieldKind,
    pub label: String,
    pub required: bool,
    pub default_value: Option<FieldValue>,
    pub validation_rules: Vec<ValidationRule>,
    pub options: Option<Vec<FieldOption>>,
    pub derived_field: Option<DerivedFieldSpec>,
}

impl NewField {
    pub fn new(kind: FieldKind, label: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            required: false,
            default_value: None,
            validation_rules: Vec::new(),
            options: None,
            derived_field: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    pub fn with_options(mut self, options: Vec<FieldOption>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn derived(mut self, spec: DerivedFieldSpec) -> Self {
        self.derived_field = Some(spec);
        self
    }

    pub(crate) fn into_field(self, id: String, order: usize) -> FormField {
        FormField {
            id,
            kind: self.kind,
            label: self.label,
            required: self.required,
            default_value: self.default_value,
            validation_rules: self.validation_rules,
            options: self.options,
            is_derived: self.derived_field.is_some(),
            derived_field: self.derived_field,
            order,
        }
    }
}
