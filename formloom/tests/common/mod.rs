//! Shared fixtures for integration tests: demo forms, a plain tool, a recording observer.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use formloom::{
    FieldSpec, FieldType, FormDefinition, FormSchema, FormValues, Tool, ToolError, ToolObserver,
    ToolOutcome, ToolRegistry, ToolSpec,
};

/// Email form: three required text fields; counts how many emails were "sent".
pub struct SendEmail {
    schema: FormSchema,
    pub sent: AtomicUsize,
    return_direct: bool,
}

impl SendEmail {
    pub fn new() -> Self {
        Self {
            schema: FormSchema::new("SendEmail")
                .with_field(FieldSpec::new("to", FieldType::Text, "Recipient address"))
                .with_field(FieldSpec::new("subject", FieldType::Text, "Subject line"))
                .with_field(FieldSpec::new("body", FieldType::Text, "Message body")),
            sent: AtomicUsize::new(0),
            return_direct: false,
        }
    }

    pub fn returning_direct() -> Self {
        Self {
            return_direct: true,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FormDefinition for SendEmail {
    fn name(&self) -> &str {
        "SendEmail"
    }

    fn description(&self) -> &str {
        "sends an email to a recipient"
    }

    fn schema(&self) -> &FormSchema {
        &self.schema
    }

    fn return_direct(&self) -> bool {
        self.return_direct
    }

    async fn execute(&self, values: &FormValues) -> Result<String, ToolError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "Email sent to {}",
            values.get("to").and_then(Value::as_str).unwrap_or_default()
        ))
    }
}

/// Purchase form with an optional field and a conditional requirement.
pub struct OnlinePurchase {
    schema: FormSchema,
}

impl OnlinePurchase {
    pub fn new() -> Self {
        Self {
            schema: FormSchema::new("OnlinePurchase")
                .with_field(FieldSpec::new("item", FieldType::Text, "What to buy"))
                .with_field(
                    FieldSpec::new("quantity", FieldType::Integer, "How many").with_validator(
                        |v| match v.as_i64() {
                            Some(n) if n > 0 => Ok(v.clone()),
                            _ => Err("quantity must be positive".into()),
                        },
                    ),
                )
                .with_field(
                    FieldSpec::new(
                        "delivery",
                        FieldType::Choice {
                            options: vec!["pickup".into(), "shipping".into()],
                        },
                        "Delivery method",
                    ),
                )
                .with_field(
                    FieldSpec::new("address", FieldType::Text, "Shipping address").optional(),
                ),
        }
    }
}

#[async_trait]
impl FormDefinition for OnlinePurchase {
    fn name(&self) -> &str {
        "OnlinePurchase"
    }

    fn description(&self) -> &str {
        "buys an item online"
    }

    fn schema(&self) -> &FormSchema {
        &self.schema
    }

    fn next_field_to_collect(&self, values: &FormValues) -> Option<String> {
        formloom::form::first_unset_required(self.schema(), values).or_else(|| {
            let shipping = values.get("delivery").and_then(Value::as_str) == Some("shipping");
            (shipping && formloom::form::is_unset(values.get("address")))
                .then(|| "address".to_string())
        })
    }

    async fn execute(&self, values: &FormValues) -> Result<String, ToolError> {
        Ok(format!(
            "Ordered {} x {}",
            values.get("quantity").cloned().unwrap_or(Value::Null),
            values.get("item").and_then(Value::as_str).unwrap_or_default()
        ))
    }
}

/// Plain tool answering with a fixed time.
pub struct Clock;

#[async_trait]
impl Tool for Clock {
    fn name(&self) -> &str {
        "Clock"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "Clock".into(),
            description: Some("Current time".into()),
            input_schema: json!({"type": "object", "properties": {}}),
        }
    }

    async fn call(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
        Ok(ToolOutcome::new("12:00"))
    }
}

/// Plain tool that always fails.
pub struct Broken;

#[async_trait]
impl Tool for Broken {
    fn name(&self) -> &str {
        "Broken"
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "Broken".into(),
            description: None,
            input_schema: json!({"type": "object"}),
        }
    }

    async fn call(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
        Err(ToolError::Execution("backend offline".into()))
    }
}

pub fn email_registry(email: &Arc<SendEmail>) -> ToolRegistry {
    ToolRegistry::new()
        .add_tool(Arc::new(Clock))
        .add_form(email.clone())
        .add_form(Arc::new(OnlinePurchase::new()))
}

/// Records every observer event as `start:<tool>`, `end:<tool>` or `error:<tool>`.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ToolObserver for RecordingObserver {
    fn on_tool_start(&self, tool: &str, _message: &str) {
        self.events.lock().unwrap().push(format!("start:{}", tool));
    }

    fn on_tool_end(&self, tool: &str, _output: &str) {
        self.events.lock().unwrap().push(format!("end:{}", tool));
    }

    fn on_tool_error(&self, tool: &str, _error: &ToolError) {
        self.events.lock().unwrap().push(format!("error:{}", tool));
    }
}

/// Observer that panics on every start event.
pub struct PanickingObserver;

impl ToolObserver for PanickingObserver {
    fn on_tool_start(&self, _tool: &str, _message: &str) {
        panic!("observer blew up");
    }

    fn on_tool_end(&self, _tool: &str, _output: &str) {}
}
