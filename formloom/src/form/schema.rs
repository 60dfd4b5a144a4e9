//! Structured-form schema: typed fields, lenient coercion and derived payload variants.
//!
//! A [`FormSchema`] is the full (all-required) description of what a form collects.
//! The planner never sees it directly; it sees one of the [`PayloadVariant`]s built by
//! [`FormSchema::payload`]. The full schema is applied only by
//! [`FormSchema::validate_complete`] when a form is finalized.
//!
//! Values are kept as a JSON object ([`FormValues`]). Every declared field is present
//! after validation; fields the user has not provided yet hold `null`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Field values of one form instance, keyed by field name.
pub type FormValues = Map<String, Value>;

/// Per-field validator: receives the coerced value, returns the (possibly normalized)
/// value or a human-readable reason.
pub type FieldValidator = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// Cross-field validator: runs on the merged value set after every field was coerced.
/// May normalize values in place. Must tolerate `null` for fields not collected yet.
pub type FormValidator = Arc<dyn Fn(&mut FormValues) -> Result<(), String> + Send + Sync>;

/// Name of the single field of the confirm payload.
pub const CONFIRM_FIELD: &str = "confirm";

const CONFIRM_DESCRIPTION: &str =
    "True if the user confirms the form, False if not or wants to change something.";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Returns true when a value counts as not provided: missing, `null`, or a blank string.
///
/// `false` and `0` are provided values.
pub fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// One rejected field with the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Merged form data violates a field or cross-field rule.
///
/// Recoverable: the tool node turns it into the agent state's `error`, so the planner
/// can correct itself. It is never shown raw to the end user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more fields failed type coercion or their own validator.
    #[error("invalid fields: {}", join_issues(.0))]
    Fields(Vec<FieldIssue>),

    /// A cross-field validator rejected the merged values.
    #[error("{0}")]
    Form(String),

    /// Required fields are still unset (full-schema check at finalize time).
    #[error("missing required fields: {}", .0.join(", "))]
    Missing(Vec<String>),

    /// The tool input was not a JSON object.
    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(String),
}

/// Semantic type of a form field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Number,
    Boolean,
    /// RFC 3339 or `YYYY-MM-DD[ HH:MM[:SS]]`.
    DateTime,
    /// One of a fixed set of options, matched case-insensitively.
    Choice { options: Vec<String> },
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn coerce_integer(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(json!(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(json!(f as i64)),
                _ => Err(format!("expected an integer, got {}", n)),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| json!(i))
            .map_err(|_| format!("expected an integer, got {:?}", s)),
        other => Err(format!("expected an integer, got {}", kind_of(other))),
    }
}

fn coerce_number(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("expected a number, got {:?}", s)),
        other => Err(format!("expected a number, got {}", kind_of(other))),
    }
}

fn coerce_bool(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(format!("expected a boolean, got {}", n)),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "n" | "0" => Ok(Value::Bool(false)),
            _ => Err(format!("expected a boolean, got {:?}", s)),
        },
        other => Err(format!("expected a boolean, got {}", kind_of(other))),
    }
}

fn coerce_datetime(value: &Value) -> Result<Value, String> {
    let Value::String(raw) = value else {
        return Err(format!("expected a date-time string, got {}", kind_of(value)));
    };
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::String(dt.to_rfc3339()));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Value::String(date.format("%Y-%m-%d").to_string()));
    }
    Err(format!(
        "expected a date-time such as 2024-05-01T09:30:00, got {:?}",
        raw
    ))
}

impl FieldType {
    /// JSON Schema fragment advertised to the planner.
    pub fn json_schema(&self) -> Value {
        match self {
            FieldType::Text => json!({ "type": "string" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Number => json!({ "type": "number" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::DateTime => json!({ "type": "string", "format": "date-time" }),
            FieldType::Choice { options } => json!({ "type": "string", "enum": options }),
        }
    }

    /// Converts a provided value into this type, accepting common string spellings.
    pub fn coerce(&self, value: &Value) -> Result<Value, String> {
        match self {
            FieldType::Text => match value {
                Value::String(s) => Ok(Value::String(s.trim().to_string())),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                other => Err(format!("expected text, got {}", kind_of(other))),
            },
            FieldType::Integer => coerce_integer(value),
            FieldType::Number => coerce_number(value),
            FieldType::Boolean => coerce_bool(value),
            FieldType::DateTime => coerce_datetime(value),
            FieldType::Choice { options } => {
                let Value::String(s) = value else {
                    return Err(format!("expected one of [{}]", options.join(", ")));
                };
                options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(s.trim()))
                    .map(|o| Value::String(o.clone()))
                    .ok_or_else(|| {
                        format!("expected one of [{}], got {:?}", options.join(", "), s)
                    })
            }
        }
    }
}

/// One field of a form: name, type, required flag, description and optional validator.
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    field_type: FieldType,
    required: bool,
    description: String,
    validator: Option<FieldValidator>,
}

impl FieldSpec {
    /// Required field with the given type and description.
    pub fn new(
        name: impl Into<String>,
        field_type: FieldType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            description: description.into(),
            validator: None,
        }
    }

    /// Marks the field optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Adds a validator that runs after type coercion.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn check(&self, raw: &Value) -> Result<Value, String> {
        let value = self.field_type.coerce(raw)?;
        match &self.validator {
            Some(validate) => validate(&value),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Which shape of a form's payload the planner is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PayloadVariant {
    /// No fields; the tool call only starts the form.
    Inactive,
    /// Every schema field, nullable and not required.
    Optional,
    /// A single required boolean `confirm`.
    Confirm,
}

/// One advertised field of a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PayloadField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub description: String,
}

/// The input shape a form tool advertises to the planner in a given state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PayloadSchema {
    pub fields: Vec<PayloadField>,
}

impl PayloadSchema {
    /// Empty payload.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// Payload with the single required boolean `confirm`.
    pub fn confirm() -> Self {
        Self {
            fields: vec![PayloadField {
                name: CONFIRM_FIELD.to_string(),
                field_type: FieldType::Boolean,
                required: true,
                nullable: false,
                description: CONFIRM_DESCRIPTION.to_string(),
            }],
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Renders the payload as a JSON Schema object for function calling.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut schema = field.field_type.json_schema();
            if let Value::Object(ref mut m) = schema {
                if field.nullable {
                    if let Some(t) = m.get("type").cloned() {
                        m.insert("type".into(), json!([t, "null"]));
                    }
                    if let Some(Value::Array(options)) = m.get_mut("enum") {
                        options.push(Value::Null);
                    }
                }
                m.insert("description".into(), json!(field.description));
            }
            properties.insert(field.name.clone(), schema);
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields(),
        })
    }
}

/// A named, ordered set of fields with optional cross-field validators.
#[derive(Clone)]
pub struct FormSchema {
    name: String,
    fields: Vec<FieldSpec>,
    validators: Vec<FormValidator>,
}

impl FormSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Appends a field; declaration order is the default collection order.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a cross-field validator.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&mut FormValues) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Derives the payload shown to the planner for the given variant.
    pub fn payload(&self, variant: PayloadVariant) -> PayloadSchema {
        match variant {
            PayloadVariant::Inactive => PayloadSchema::inactive(),
            PayloadVariant::Confirm => PayloadSchema::confirm(),
            PayloadVariant::Optional => PayloadSchema {
                fields: self
                    .fields
                    .iter()
                    .map(|f| PayloadField {
                        name: f.name.clone(),
                        field_type: f.field_type.clone(),
                        required: false,
                        nullable: true,
                        description: f.description.clone(),
                    })
                    .collect(),
            },
        }
    }

    /// Validates a partial form: coerces each provided field, leaves unset ones `null`,
    /// drops undeclared keys, then runs cross-field validators on the merged set.
    pub fn validate_partial(&self, values: &FormValues) -> Result<FormValues, ValidationError> {
        let mut out = FormValues::new();
        let mut issues = Vec::new();
        for field in &self.fields {
            let raw = values.get(&field.name);
            if is_unset(raw) {
                out.insert(field.name.clone(), Value::Null);
                continue;
            }
            let Some(raw) = raw else { continue };
            match field.check(raw) {
                Ok(v) => {
                    out.insert(field.name.clone(), v);
                }
                Err(message) => issues.push(FieldIssue {
                    field: field.name.clone(),
                    message,
                }),
            }
        }
        if !issues.is_empty() {
            return Err(ValidationError::Fields(issues));
        }
        for validate in &self.validators {
            validate(&mut out).map_err(ValidationError::Form)?;
        }
        Ok(out)
    }

    /// Full-schema validation: [`validate_partial`](Self::validate_partial) plus every
    /// required field set.
    pub fn validate_complete(&self, values: &FormValues) -> Result<FormValues, ValidationError> {
        let values = self.validate_partial(values)?;
        let missing = self.missing_required(&values);
        if !missing.is_empty() {
            return Err(ValidationError::Missing(missing));
        }
        Ok(values)
    }

    /// Required fields still unset, in declaration order.
    pub fn missing_required(&self, values: &FormValues) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.required && is_unset(values.get(&f.name)))
            .map(|f| f.name.clone())
            .collect()
    }
}

impl fmt::Debug for FormSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSchema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("validators", &self.validators.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_schema() -> FormSchema {
        FormSchema::new("SendEmail")
            .with_field(FieldSpec::new("to", FieldType::Text, "Recipient address"))
            .with_field(FieldSpec::new("subject", FieldType::Text, "Subject line"))
            .with_field(FieldSpec::new("body", FieldType::Text, "Message body"))
            .with_field(FieldSpec::new("cc", FieldType::Text, "Copy address").optional())
    }

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap()
    }

    /// **Scenario**: Inactive payload has no fields at all.
    #[test]
    fn inactive_payload_is_empty() {
        let p = email_schema().payload(PayloadVariant::Inactive);
        assert!(p.fields.is_empty());
        assert!(p.required_fields().is_empty());
    }

    /// **Scenario**: Optional payload mirrors the schema's field names and requires none.
    #[test]
    fn optional_payload_has_same_names_and_no_required() {
        let p = email_schema().payload(PayloadVariant::Optional);
        assert_eq!(p.field_names(), vec!["to", "subject", "body", "cc"]);
        assert!(p.required_fields().is_empty());
        assert!(p.fields.iter().all(|f| f.nullable));
    }

    /// **Scenario**: Confirm payload is exactly one required boolean named confirm.
    #[test]
    fn confirm_payload_is_single_boolean() {
        let p = email_schema().payload(PayloadVariant::Confirm);
        assert_eq!(p.fields.len(), 1);
        assert_eq!(p.fields[0].name, CONFIRM_FIELD);
        assert_eq!(p.fields[0].field_type, FieldType::Boolean);
        assert_eq!(p.required_fields(), vec!["confirm"]);
    }

    #[test]
    fn json_schema_marks_optional_fields_nullable() {
        let schema = email_schema()
            .payload(PayloadVariant::Optional)
            .to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["to"]["type"], json!(["string", "null"]));
        assert_eq!(schema["required"], json!([]));
        let confirm = PayloadSchema::confirm().to_json_schema();
        assert_eq!(confirm["properties"]["confirm"]["type"], "boolean");
        assert_eq!(confirm["required"], json!(["confirm"]));
    }

    #[test]
    fn nullable_choice_allows_null_in_enum() {
        let schema = FormSchema::new("F")
            .with_field(FieldSpec::new(
                "region",
                FieldType::Choice {
                    options: vec!["north".into(), "south".into()],
                },
                "Region",
            ))
            .payload(PayloadVariant::Optional)
            .to_json_schema();
        assert_eq!(
            schema["properties"]["region"]["enum"],
            json!(["north", "south", null])
        );
    }

    /// **Scenario**: Unset means missing, null or blank; false and zero count as set.
    #[test]
    fn is_unset_semantics() {
        assert!(is_unset(None));
        assert!(is_unset(Some(&Value::Null)));
        assert!(is_unset(Some(&json!("   "))));
        assert!(!is_unset(Some(&json!(false))));
        assert!(!is_unset(Some(&json!(0))));
        assert!(!is_unset(Some(&json!("x"))));
    }

    #[test]
    fn validate_partial_fills_nulls_and_drops_unknown_keys() {
        let out = email_schema()
            .validate_partial(&values(json!({"to": " a@b.com ", "bogus": 1})))
            .unwrap();
        assert_eq!(out["to"], "a@b.com");
        assert_eq!(out["subject"], Value::Null);
        assert!(!out.contains_key("bogus"));
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn coercion_accepts_common_spellings() {
        assert_eq!(FieldType::Integer.coerce(&json!("42")).unwrap(), json!(42));
        assert_eq!(FieldType::Integer.coerce(&json!(3.0)).unwrap(), json!(3));
        assert!(FieldType::Integer.coerce(&json!(3.5)).is_err());
        assert_eq!(FieldType::Number.coerce(&json!("2.5")).unwrap(), json!(2.5));
        assert_eq!(FieldType::Boolean.coerce(&json!("Yes")).unwrap(), json!(true));
        assert_eq!(FieldType::Boolean.coerce(&json!(0)).unwrap(), json!(false));
        assert!(FieldType::Boolean.coerce(&json!("maybe")).is_err());
        let choice = FieldType::Choice {
            options: vec!["Puglia".into(), "Sicilia".into()],
        };
        assert_eq!(choice.coerce(&json!("sicilia")).unwrap(), json!("Sicilia"));
        assert!(choice.coerce(&json!("lazio")).is_err());
    }

    #[test]
    fn datetime_coercion_normalizes_formats() {
        assert_eq!(
            FieldType::DateTime.coerce(&json!("2024-05-01 09:30")).unwrap(),
            json!("2024-05-01T09:30:00")
        );
        assert_eq!(
            FieldType::DateTime.coerce(&json!("2024-05-01")).unwrap(),
            json!("2024-05-01")
        );
        assert_eq!(
            FieldType::DateTime
                .coerce(&json!("2024-05-01T09:30:00+02:00"))
                .unwrap(),
            json!("2024-05-01T09:30:00+02:00")
        );
        assert!(FieldType::DateTime.coerce(&json!("tomorrow")).is_err());
    }

    /// **Scenario**: Field errors are collected for every bad field, not just the first.
    #[test]
    fn field_issues_are_collected() {
        let schema = FormSchema::new("F")
            .with_field(FieldSpec::new("qty", FieldType::Integer, "Quantity"))
            .with_field(FieldSpec::new("gift", FieldType::Boolean, "Gift wrap"));
        let err = schema
            .validate_partial(&values(json!({"qty": "many", "gift": "perhaps"})))
            .unwrap_err();
        match &err {
            ValidationError::Fields(issues) => {
                assert_eq!(issues.len(), 2);
                assert_eq!(issues[0].field, "qty");
            }
            other => panic!("expected Fields, got {:?}", other),
        }
        assert!(err.to_string().contains("qty:"));
        assert!(err.to_string().contains("gift:"));
    }

    #[test]
    fn field_validator_runs_after_coercion() {
        let schema = FormSchema::new("F").with_field(
            FieldSpec::new("qty", FieldType::Integer, "Quantity").with_validator(|v| {
                match v.as_i64() {
                    Some(n) if (1..=10).contains(&n) => Ok(v.clone()),
                    _ => Err("must be between 1 and 10".into()),
                }
            }),
        );
        assert!(schema.validate_partial(&values(json!({"qty": "5"}))).is_ok());
        let err = schema
            .validate_partial(&values(json!({"qty": "11"})))
            .unwrap_err();
        assert!(err.to_string().contains("between 1 and 10"));
    }

    #[test]
    fn cross_field_validator_sees_merged_values() {
        let schema = FormSchema::new("F")
            .with_field(FieldSpec::new("start", FieldType::Integer, "Start"))
            .with_field(FieldSpec::new("end", FieldType::Integer, "End"))
            .with_validator(|v| match (v["start"].as_i64(), v["end"].as_i64()) {
                (Some(s), Some(e)) if e < s => Err("end must not precede start".into()),
                _ => Ok(()),
            });
        assert!(schema
            .validate_partial(&values(json!({"start": 5})))
            .is_ok());
        let err = schema
            .validate_partial(&values(json!({"start": 5, "end": 1})))
            .unwrap_err();
        assert_eq!(err, ValidationError::Form("end must not precede start".into()));
    }

    #[test]
    fn validate_complete_reports_missing_required_only() {
        let err = email_schema()
            .validate_complete(&values(json!({"to": "a@b.com"})))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::Missing(vec!["subject".into(), "body".into()])
        );
        let ok = email_schema()
            .validate_complete(&values(json!({"to": "a", "subject": "s", "body": "b"})))
            .unwrap();
        assert_eq!(ok["cc"], Value::Null);
    }
}
