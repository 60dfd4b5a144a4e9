//! The trait a concrete form implements: schema, completion action and optional hooks.

use async_trait::async_trait;
use serde_json::Value;

use super::schema::{is_unset, FormSchema, FormValues};
use super::state::FormToolState;
use crate::tools::ToolError;

/// One kind of form the agent can fill (send an email, book a flight, ...).
///
/// Implementations are shared (`Arc<dyn FormDefinition>`) by every [`FormTool`](super::FormTool)
/// instance of that form; per-conversation data lives in the tool, not here.
#[async_trait]
pub trait FormDefinition: Send + Sync {
    /// Base name; the tool is advertised as `<name>Start`, `<name>Update`, `<name>Finalize`.
    fn name(&self) -> &str;

    /// What the form does, completing the sentence "which ...".
    fn description(&self) -> &str;

    /// Full schema of the values to collect.
    fn schema(&self) -> &FormSchema;

    /// When true, a filled form runs its action without asking for confirmation.
    fn skip_confirm(&self) -> bool {
        false
    }

    /// When true, the action's text goes straight to the user without another planner turn.
    fn return_direct(&self) -> bool {
        false
    }

    /// Next field to ask the user for, or `None` when the form is complete.
    ///
    /// Default: first unset required field in declaration order. Override to encode
    /// conditional requirements (a field required only when another has some value).
    fn next_field_to_collect(&self, values: &FormValues) -> Option<String> {
        first_unset_required(self.schema(), values)
    }

    /// Custom observer message for a tool start; `None` uses the default for the state.
    fn start_message(&self, _state: FormToolState, _input: &Value) -> Option<String> {
        None
    }

    /// The action executor: performs the real-world effect with fully validated values.
    ///
    /// Errors should describe what went wrong; the text is handed to the planner so it
    /// can fix the input and retry.
    async fn execute(&self, values: &FormValues) -> Result<String, ToolError>;
}

/// First required field of `schema` that is unset in `values`.
pub fn first_unset_required(schema: &FormSchema, values: &FormValues) -> Option<String> {
    schema
        .fields()
        .iter()
        .find(|f| f.is_required() && is_unset(values.get(f.name())))
        .map(|f| f.name().to_string())
}
