//! Form tool: a three-state machine (INACTIVE → ACTIVE → FILLED) around one form.
//!
//! Each conversation works on its own clone of a [`FormTool`]; the collected values live
//! in the instance, the schema and the action live in the shared [`FormDefinition`].
//!
//! | From | Call | To |
//! |---|---|---|
//! | INACTIVE | [`activate`](FormTool::activate) | ACTIVE |
//! | ACTIVE | [`update`](FormTool::update), form complete | FILLED (or action fires when `skip_confirm`) |
//! | ACTIVE | [`update`](FormTool::update), fields missing | ACTIVE |
//! | FILLED | [`finalize`](FormTool::finalize) `confirm=true` | action fires, instance done |
//! | FILLED | [`finalize`](FormTool::finalize) `confirm=false` | ACTIVE |
//!
//! Errors are returned, never panicked: validation problems as
//! [`ToolError::Validation`], action failures as [`ToolError::Execution`]. A failed call
//! leaves the agent state's copy of the tool untouched because the tool node only
//! merges successful outcomes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::definition::FormDefinition;
use super::schema::{is_unset, FieldIssue, FieldType, FormValues, ValidationError, CONFIRM_FIELD};
use super::state::{describe, identity_name, FormToolState, ToolIdentity};
use crate::outcome::ToolOutcome;
use crate::tools::{ToolError, ToolSpec};

const UPDATED_OUTPUT: &str =
    "Form updated with the provided information. Ask the user for the next field.";
const FILLED_OUTPUT: &str = "Form is filled. Ask the user to confirm the information.";
const REJECTED_OUTPUT: &str = "Ask the user to update the form.";

/// Flattened, serializable form tool: which form, which state, which values.
///
/// The schema is not stored; [`FormRegistry::restore`](super::FormRegistry::restore)
/// looks it up again by `form_name`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormToolSnapshot {
    pub form_name: String,
    pub state: FormToolState,
    #[serde(default)]
    pub values: Option<FormValues>,
}

/// One form instance with its collection state.
#[derive(Clone)]
pub struct FormTool {
    definition: Arc<dyn FormDefinition>,
    state: FormToolState,
    form: Option<FormValues>,
}

fn empty_form(definition: &dyn FormDefinition) -> FormValues {
    definition
        .schema()
        .fields()
        .iter()
        .map(|f| (f.name().to_string(), Value::Null))
        .collect()
}

fn json_kind(value: &Value) -> String {
    match value {
        Value::Null => "null".into(),
        Value::Array(_) => "a list".into(),
        other => other.to_string(),
    }
}

impl FormTool {
    /// Fresh, inactive tool for `definition`.
    pub fn new(definition: Arc<dyn FormDefinition>) -> Self {
        Self {
            definition,
            state: FormToolState::Inactive,
            form: None,
        }
    }

    pub(crate) fn from_parts(
        definition: Arc<dyn FormDefinition>,
        state: FormToolState,
        form: Option<FormValues>,
    ) -> Self {
        let form = match state {
            FormToolState::Inactive => None,
            _ => Some(form.unwrap_or_else(|| empty_form(definition.as_ref()))),
        };
        Self {
            definition,
            state,
            form,
        }
    }

    pub fn definition(&self) -> &Arc<dyn FormDefinition> {
        &self.definition
    }

    /// Base form name (without the state suffix).
    pub fn form_name(&self) -> &str {
        self.definition.name()
    }

    pub fn state(&self) -> FormToolState {
        self.state
    }

    /// Collected values; `None` while inactive.
    pub fn form(&self) -> Option<&FormValues> {
        self.form.as_ref()
    }

    /// Advertised name in the current state, e.g. `SendEmailUpdate`.
    pub fn name(&self) -> String {
        identity_name(self.definition.name(), self.state)
    }

    pub fn identity(&self) -> ToolIdentity {
        describe(self.definition.as_ref(), self.state)
    }

    /// Planner-facing description in the current state.
    pub fn spec(&self) -> ToolSpec {
        let identity = self.identity();
        ToolSpec {
            name: identity.name,
            description: Some(identity.description),
            input_schema: identity.payload.to_json_schema(),
        }
    }

    /// Runs the operation valid in the current state.
    pub async fn invoke(&mut self, input: &Value) -> Result<ToolOutcome, ToolError> {
        match self.state {
            FormToolState::Inactive => self.activate(input),
            FormToolState::Active => self.update(input).await,
            FormToolState::Filled => self.finalize(input).await,
        }
    }

    /// INACTIVE → ACTIVE: starts an empty form and forces the planner to the update tool.
    pub fn activate(&mut self, _input: &Value) -> Result<ToolOutcome, ToolError> {
        self.expect_state(FormToolState::Inactive, "activate")?;
        self.form = Some(empty_form(self.definition.as_ref()));
        self.state = FormToolState::Active;
        let update_name = self.name();
        debug!(form = %self.form_name(), "form activated");
        Ok(ToolOutcome::new(format!(
            "Starting form {0}. If the user has already provided some information, call {0}.",
            update_name
        ))
        .with_active_form_tool(Some(self.clone()))
        .with_tool_choice(Some(update_name)))
    }

    /// Merges `input` into the stored values and re-validates the whole set.
    ///
    /// `null` entries in `input` are ignored so a partial call never erases collected data.
    /// Allowed from ACTIVE and FILLED; from FILLED it re-checks completeness and never
    /// fires the action on its own (unless `skip_confirm`).
    pub async fn update(&mut self, input: &Value) -> Result<ToolOutcome, ToolError> {
        if self.state == FormToolState::Inactive {
            return Err(self.invalid_state("update"));
        }
        let provided = input
            .as_object()
            .ok_or_else(|| ValidationError::NotAnObject(json_kind(input)))?;
        let mut merged = self.form.clone().unwrap_or_default();
        for (key, value) in provided {
            if !value.is_null() {
                merged.insert(key.clone(), value.clone());
            }
        }
        let validated = self.definition.schema().validate_partial(&merged)?;
        let next_field = self.definition.next_field_to_collect(&validated);
        self.form = Some(validated);

        if let Some(field) = next_field {
            self.state = FormToolState::Active;
            debug!(form = %self.form_name(), next_field = %field, "form updated");
            return Ok(ToolOutcome::new(UPDATED_OUTPUT).with_active_form_tool(Some(self.clone())));
        }

        self.state = FormToolState::Filled;
        debug!(form = %self.form_name(), "form filled");
        if self.definition.skip_confirm() {
            return self.complete().await;
        }
        Ok(ToolOutcome::new(FILLED_OUTPUT).with_active_form_tool(Some(self.clone())))
    }

    /// FILLED: `confirm=true` runs the action, `confirm=false` goes back to ACTIVE.
    pub async fn finalize(&mut self, input: &Value) -> Result<ToolOutcome, ToolError> {
        self.expect_state(FormToolState::Filled, "finalize")?;
        let raw = input.get(CONFIRM_FIELD);
        if is_unset(raw) {
            return Err(confirm_issue("field required".into()).into());
        }
        let confirm = raw
            .map(|v| FieldType::Boolean.coerce(v))
            .transpose()
            .map_err(confirm_issue)?;
        if confirm.and_then(|v| v.as_bool()) == Some(true) {
            self.complete().await
        } else {
            self.state = FormToolState::Active;
            debug!(form = %self.form_name(), "confirmation rejected, back to collecting");
            Ok(ToolOutcome::new(REJECTED_OUTPUT).with_active_form_tool(Some(self.clone())))
        }
    }

    /// Next field to ask for; `None` unless the form is being collected.
    pub fn next_field_to_collect(&self) -> Option<String> {
        match (self.state, &self.form) {
            (FormToolState::Active, Some(form)) => self.definition.next_field_to_collect(form),
            _ => None,
        }
    }

    /// Observer message for a call about to start.
    pub fn tool_start_message(&self, input: &Value) -> String {
        if let Some(custom) = self.definition.start_message(self.state, input) {
            return custom;
        }
        let name = self.name();
        match self.state {
            FormToolState::Inactive => format!("Starting {}", name),
            FormToolState::Active => format!("Updating form for {}", name),
            FormToolState::Filled => format!("Completed {}", name),
        }
    }

    pub fn snapshot(&self) -> FormToolSnapshot {
        FormToolSnapshot {
            form_name: self.form_name().to_string(),
            state: self.state,
            values: self.form.clone(),
        }
    }

    async fn complete(&mut self) -> Result<ToolOutcome, ToolError> {
        let current = self.form.clone().unwrap_or_default();
        let values = self.definition.schema().validate_complete(&current)?;
        let output = self.definition.execute(&values).await?;
        info!(form = %self.form_name(), "form completed");
        self.state = FormToolState::Inactive;
        self.form = None;
        Ok(ToolOutcome::new(output)
            .with_active_form_tool(None)
            .with_return_direct(self.definition.return_direct()))
    }

    fn expect_state(
        &self,
        expected: FormToolState,
        operation: &'static str,
    ) -> Result<(), ToolError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> ToolError {
        ToolError::InvalidState {
            tool: self.name(),
            operation,
            state: self.state,
        }
    }
}

fn confirm_issue(message: String) -> ValidationError {
    ValidationError::Fields(vec![FieldIssue {
        field: CONFIRM_FIELD.to_string(),
        message,
    }])
}

impl fmt::Debug for FormTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormTool")
            .field("form", &self.definition.name())
            .field("state", &self.state)
            .field("values", &self.form)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::form::{FieldSpec, FormSchema};

    struct SendEmail {
        schema: FormSchema,
        sent: AtomicUsize,
        skip_confirm: bool,
        fail: bool,
    }

    impl SendEmail {
        fn new() -> Self {
            Self {
                schema: FormSchema::new("SendEmail")
                    .with_field(FieldSpec::new("to", FieldType::Text, "Recipient"))
                    .with_field(FieldSpec::new("subject", FieldType::Text, "Subject"))
                    .with_field(FieldSpec::new("body", FieldType::Text, "Body")),
                sent: AtomicUsize::new(0),
                skip_confirm: false,
                fail: false,
            }
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
        fn skip_confirm(&self) -> bool {
            self.skip_confirm
        }
        fn return_direct(&self) -> bool {
            true
        }
        async fn execute(&self, values: &FormValues) -> Result<String, ToolError> {
            if self.fail {
                return Err(ToolError::Execution("mail server unavailable".into()));
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Email sent to {}", values["to"].as_str().unwrap_or("")))
        }
    }

    fn tool(def: &Arc<SendEmail>) -> FormTool {
        FormTool::new(def.clone() as Arc<dyn FormDefinition>)
    }

    async fn filled(def: &Arc<SendEmail>) -> FormTool {
        let mut t = tool(def);
        t.activate(&json!({})).unwrap();
        t.update(&json!({"to": "a@b.com", "subject": "hi", "body": "test"}))
            .await
            .unwrap();
        t
    }

    /// **Scenario**: activate forces the planner to the update tool and marks the tool active.
    #[tokio::test]
    async fn activate_sets_active_state_and_forced_choice() {
        let def = Arc::new(SendEmail::new());
        let mut t = tool(&def);
        assert_eq!(t.name(), "SendEmailStart");
        let outcome = t.activate(&json!({})).unwrap();
        assert_eq!(t.state(), FormToolState::Active);
        assert_eq!(t.name(), "SendEmailUpdate");
        assert!(outcome.output.contains("call SendEmailUpdate"));
        assert_eq!(
            outcome.state_update.tool_choice,
            Some(Some("SendEmailUpdate".to_string()))
        );
        let active = outcome.state_update.active_form_tool.flatten().unwrap();
        assert_eq!(active.state(), FormToolState::Active);
        assert!(t.activate(&json!({})).is_err());
    }

    /// **Scenario**: {to, subject, body} fills after the third update, not before.
    #[tokio::test]
    async fn three_updates_fill_the_form() {
        let def = Arc::new(SendEmail::new());
        let mut t = tool(&def);
        t.activate(&json!({})).unwrap();
        assert_eq!(t.next_field_to_collect().as_deref(), Some("to"));

        let o = t.update(&json!({"to": "a@b.com"})).await.unwrap();
        assert_eq!(o.output, UPDATED_OUTPUT);
        assert_eq!(t.state(), FormToolState::Active);
        assert_eq!(t.next_field_to_collect().as_deref(), Some("subject"));

        t.update(&json!({"subject": "hi"})).await.unwrap();
        assert_eq!(t.state(), FormToolState::Active);
        assert_eq!(t.next_field_to_collect().as_deref(), Some("body"));

        let o = t.update(&json!({"body": "test"})).await.unwrap();
        assert_eq!(o.output, FILLED_OUTPUT);
        assert_eq!(t.state(), FormToolState::Filled);
        assert_eq!(t.name(), "SendEmailFinalize");
        assert!(t.next_field_to_collect().is_none());
    }

    /// **Scenario**: Repeating an update with the same complete data stays FILLED and sends nothing.
    #[tokio::test]
    async fn repeated_update_is_idempotent() {
        let def = Arc::new(SendEmail::new());
        let mut t = filled(&def).await;
        let before = t.form().cloned();
        t.update(&json!({"to": "a@b.com", "subject": "hi", "body": "test"}))
            .await
            .unwrap();
        assert_eq!(t.state(), FormToolState::Filled);
        assert_eq!(t.form().cloned(), before);
        assert_eq!(def.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn null_inputs_do_not_erase_collected_values() {
        let def = Arc::new(SendEmail::new());
        let mut t = tool(&def);
        t.activate(&json!({})).unwrap();
        t.update(&json!({"to": "a@b.com"})).await.unwrap();
        t.update(&json!({"to": null, "subject": "hi"})).await.unwrap();
        assert_eq!(t.form().unwrap()["to"], "a@b.com");
    }

    /// **Scenario**: Rejecting confirmation returns to ACTIVE with values intact.
    #[tokio::test]
    async fn finalize_false_returns_to_active_without_data_loss() {
        let def = Arc::new(SendEmail::new());
        let mut t = filled(&def).await;
        let before = t.form().cloned();
        let o = t.finalize(&json!({"confirm": false})).await.unwrap();
        assert_eq!(o.output, REJECTED_OUTPUT);
        assert_eq!(t.state(), FormToolState::Active);
        assert_eq!(t.form().cloned(), before);
        assert_eq!(def.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn finalize_true_runs_action_once_and_clears_active_tool() {
        let def = Arc::new(SendEmail::new());
        let mut t = filled(&def).await;
        let o = t.invoke(&json!({"confirm": "yes"})).await.unwrap();
        assert_eq!(o.output, "Email sent to a@b.com");
        assert!(o.return_direct);
        assert!(matches!(o.state_update.active_form_tool, Some(None)));
        assert_eq!(def.sent.load(Ordering::SeqCst), 1);
        assert_eq!(t.state(), FormToolState::Inactive);
    }

    #[tokio::test]
    async fn finalize_requires_confirm_field() {
        let def = Arc::new(SendEmail::new());
        let mut t = filled(&def).await;
        let err = t.finalize(&json!({})).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert!(err.to_string().contains("confirm"));
        let err = t.finalize(&json!({"confirm": "perhaps"})).await.unwrap_err();
        assert_eq!(err.kind(), "ValidationError");
        assert_eq!(t.state(), FormToolState::Filled);
    }

    #[tokio::test]
    async fn skip_confirm_runs_action_on_fill() {
        let mut def = SendEmail::new();
        def.skip_confirm = true;
        let def = Arc::new(def);
        let mut t = tool(&def);
        t.activate(&json!({})).unwrap();
        let o = t
            .update(&json!({"to": "x@y.z", "subject": "s", "body": "b"}))
            .await
            .unwrap();
        assert_eq!(o.output, "Email sent to x@y.z");
        assert_eq!(def.sent.load(Ordering::SeqCst), 1);
    }

    /// **Scenario**: A failing action surfaces as ToolExecutionError and keeps the form FILLED.
    #[tokio::test]
    async fn execute_failure_keeps_filled_state() {
        let mut def = SendEmail::new();
        def.fail = true;
        let def = Arc::new(def);
        let mut t = filled(&def).await;
        let err = t.finalize(&json!({"confirm": true})).await.unwrap_err();
        assert_eq!(
            err.observation(),
            "ToolExecutionError: mail server unavailable"
        );
        assert_eq!(t.state(), FormToolState::Filled);
    }

    #[tokio::test]
    async fn update_rejects_non_object_and_inactive() {
        let def = Arc::new(SendEmail::new());
        let mut t = tool(&def);
        let err = t.update(&json!({"to": "a"})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidState { .. }));
        t.activate(&json!({})).unwrap();
        let err = t.update(&json!("to=a")).await.unwrap_err();
        assert!(matches!(
            err,
            ToolError::Validation(ValidationError::NotAnObject(_))
        ));
    }

    #[tokio::test]
    async fn start_messages_follow_state() {
        let def = Arc::new(SendEmail::new());
        let mut t = tool(&def);
        assert_eq!(t.tool_start_message(&json!({})), "Starting SendEmailStart");
        t.activate(&json!({})).unwrap();
        assert_eq!(
            t.tool_start_message(&json!({})),
            "Updating form for SendEmailUpdate"
        );
        let t = filled(&def).await;
        assert_eq!(
            t.tool_start_message(&json!({})),
            "Completed SendEmailFinalize"
        );
    }

    #[tokio::test]
    async fn spec_tracks_identity() {
        let def = Arc::new(SendEmail::new());
        let t = filled(&def).await;
        let spec = t.spec();
        assert_eq!(spec.name, "SendEmailFinalize");
        assert_eq!(spec.input_schema["required"], json!(["confirm"]));
    }
}
