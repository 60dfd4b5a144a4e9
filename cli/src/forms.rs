//! Demo forms and tools shipped with the CLI.
//!
//! Actions are simulated: nothing leaves the machine. They exist to show the form
//! lifecycle (conditional fields, cross-field rules, custom start messages).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};

use formloom::form::{is_unset, FieldSpec, FieldType, FormDefinition, FormSchema, FormValues};
use formloom::{FormToolState, Tool, ToolError, ToolOutcome, ToolRegistry, ToolSpec};

fn text(values: &FormValues, key: &str) -> String {
    values
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn looks_like_email(v: &Value) -> Result<Value, String> {
    match v.as_str() {
        Some(s) if s.contains('@') && !s.starts_with('@') && !s.ends_with('@') => Ok(v.clone()),
        _ => Err("must be an email address".into()),
    }
}

pub struct SendEmail {
    schema: FormSchema,
}

impl SendEmail {
    pub fn new() -> Self {
        Self {
            schema: FormSchema::new("SendEmail")
                .with_field(
                    FieldSpec::new("to", FieldType::Text, "Recipient email address")
                        .with_validator(looks_like_email),
                )
                .with_field(FieldSpec::new("subject", FieldType::Text, "Subject of the email"))
                .with_field(FieldSpec::new("body", FieldType::Text, "Body of the email")),
        }
    }
}

impl Default for SendEmail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormDefinition for SendEmail {
    fn name(&self) -> &str {
        "SendEmail"
    }

    fn description(&self) -> &str {
        "sends an email"
    }

    fn schema(&self) -> &FormSchema {
        &self.schema
    }

    fn return_direct(&self) -> bool {
        true
    }

    fn start_message(&self, state: FormToolState, input: &Value) -> Option<String> {
        if state == FormToolState::Inactive {
            return None;
        }
        let field = |k: &str| input.get(k).and_then(Value::as_str).unwrap_or("-");
        Some(format!(
            "Email draft\n  To: {}\n  Subject: {}\n  Body: {}",
            field("to"),
            field("subject"),
            field("body")
        ))
    }

    async fn execute(&self, values: &FormValues) -> Result<String, ToolError> {
        tracing::info!(to = %text(values, "to"), "demo email sent");
        Ok(format!(
            "Email \"{}\" sent to {}.",
            text(values, "subject"),
            text(values, "to")
        ))
    }
}

const REGIONS: &[(&str, &[&str])] = &[
    ("puglia", &["bari", "bat", "brindisi", "foggia", "lecce", "taranto"]),
    (
        "sicilia",
        &[
            "agrigento",
            "caltanissetta",
            "catania",
            "enna",
            "messina",
            "palermo",
            "ragusa",
            "siracusa",
            "trapani",
        ],
    ),
    (
        "toscana",
        &[
            "arezzo",
            "firenze",
            "grosseto",
            "livorno",
            "lucca",
            "massa-carrara",
            "pisa",
            "pistoia",
            "prato",
            "siena",
        ],
    ),
];

fn provinces_of(region: &str) -> &'static [&'static str] {
    REGIONS
        .iter()
        .find(|(r, _)| *r == region)
        .map(|(_, p)| *p)
        .unwrap_or(&[])
}

/// Province must belong to the region; stored lowercase.
fn check_province(values: &mut FormValues) -> Result<(), String> {
    let Some(province) = values.get("province").and_then(Value::as_str) else {
        return Ok(());
    };
    let province = province.trim().to_lowercase();
    if let Some(region) = values.get("region").and_then(Value::as_str) {
        let allowed = provinces_of(region);
        if !allowed.contains(&province.as_str()) {
            return Err(format!(
                "province must be one of [{}]",
                allowed.join(", ")
            ));
        }
    }
    values.insert("province".into(), Value::String(province));
    Ok(())
}

fn is_ebook(values: &FormValues) -> Option<bool> {
    values.get("ebook").and_then(Value::as_bool)
}

pub struct OnlinePurchase {
    schema: FormSchema,
}

impl OnlinePurchase {
    pub fn new() -> Self {
        let region_options = REGIONS.iter().map(|(r, _)| r.to_string()).collect();
        Self {
            schema: FormSchema::new("OnlinePurchase")
                .with_field(FieldSpec::new(
                    "item",
                    FieldType::Choice {
                        options: vec![
                            "watch".into(),
                            "shoes".into(),
                            "phone".into(),
                            "book".into(),
                        ],
                    },
                    "Item to purchase",
                ))
                .with_field(
                    FieldSpec::new(
                        "ebook",
                        FieldType::Boolean,
                        "For books: true for an ebook, false for a printed copy",
                    )
                    .optional(),
                )
                .with_field(
                    FieldSpec::new("email", FieldType::Text, "Email to send the ebook to")
                        .optional()
                        .with_validator(looks_like_email),
                )
                .with_field(
                    FieldSpec::new(
                        "quantity",
                        FieldType::Integer,
                        "Quantity of items to purchase, between 1 and 10",
                    )
                    .with_validator(|v| match v.as_i64() {
                        Some(n) if (1..=10).contains(&n) => Ok(v.clone()),
                        _ => Err("quantity must be between 1 and 10".into()),
                    }),
                )
                .with_field(
                    FieldSpec::new(
                        "region",
                        FieldType::Choice {
                            options: region_options,
                        },
                        "Region to ship the item to",
                    )
                    .optional(),
                )
                .with_field(
                    FieldSpec::new("province", FieldType::Text, "Province to ship the item to")
                        .optional(),
                )
                .with_field(
                    FieldSpec::new("address", FieldType::Text, "Street address for shipping")
                        .optional(),
                )
                .with_validator(check_province),
        }
    }
}

impl Default for OnlinePurchase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FormDefinition for OnlinePurchase {
    fn name(&self) -> &str {
        "OnlinePurchase"
    }

    fn description(&self) -> &str {
        "purchases an item from an online store"
    }

    fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Books ask ebook-or-print first; ebooks need an email and no shipping details.
    fn next_field_to_collect(&self, values: &FormValues) -> Option<String> {
        let unset = |k: &str| is_unset(values.get(k));
        if unset("item") {
            return Some("item".into());
        }
        let book = values.get("item").and_then(Value::as_str) == Some("book");
        if book && is_ebook(values).is_none() {
            return Some("ebook".into());
        }
        if book && is_ebook(values) == Some(true) {
            return ["email", "quantity"]
                .into_iter()
                .find(|k| unset(*k))
                .map(str::to_string);
        }
        ["quantity", "region", "province", "address"]
            .into_iter()
            .find(|k| unset(*k))
            .map(str::to_string)
    }

    async fn execute(&self, values: &FormValues) -> Result<String, ToolError> {
        let item = text(values, "item");
        let quantity = values.get("quantity").and_then(Value::as_i64).unwrap_or(1);
        if is_ebook(values) == Some(true) {
            return Ok(format!(
                "Order placed: {} x {} (ebook) delivered to {}.",
                quantity,
                item,
                text(values, "email")
            ));
        }
        Ok(format!(
            "Order placed: {} x {} shipping to {}, {} ({}).",
            quantity,
            item,
            text(values, "address"),
            text(values, "province"),
            text(values, "region")
        ))
    }
}

/// Plain tool: the local date and time.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentDateTime;

#[async_trait]
impl Tool for CurrentDateTime {
    fn name(&self) -> &str {
        "CurrentDateTime"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: Some("Returns the current local date and time".into()),
            input_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    async fn call(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
        Ok(ToolOutcome::new(
            Local::now().format("%A %Y-%m-%d %H:%M").to_string(),
        ))
    }
}

/// Every demo tool and form.
pub fn demo_registry() -> ToolRegistry {
    ToolRegistry::new()
        .add_tool(Arc::new(CurrentDateTime))
        .add_form(Arc::new(SendEmail::new()))
        .add_form(Arc::new(OnlinePurchase::new()))
}
