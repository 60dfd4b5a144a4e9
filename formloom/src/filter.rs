//! Tool selection: the subset of registered tools the planner may see this step.
//!
//! With no active form every registered tool is offered, forms in their `Start`
//! identity. While a form is active, the other forms are hidden, the active form is
//! offered in its current identity, and `FormReset` is appended.

use crate::state::AgentState;
use crate::tools::{AvailableTool, ToolRegistry};

/// Computes the visible tool list for `state`. Order follows registration, with
/// `FormReset` last.
pub fn select_tools(registry: &ToolRegistry, state: &AgentState) -> Vec<AvailableTool> {
    let Some(active) = &state.active_form_tool else {
        return registry.entries().to_vec();
    };

    let mut tools = Vec::with_capacity(registry.entries().len() + 1);
    let mut placed = false;
    for entry in registry.entries() {
        match entry {
            AvailableTool::Base(_) => tools.push(entry.clone()),
            AvailableTool::Form(form) if form.form_name() == active.form_name() => {
                tools.push(AvailableTool::Form(active.clone()));
                placed = true;
            }
            AvailableTool::Form(_) => {}
        }
    }
    if !placed {
        tools.push(AvailableTool::Form(active.clone()));
    }
    tools.push(registry.reset_tool());
    tools
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use crate::form::{FieldSpec, FieldType, FormDefinition, FormSchema, FormTool, FormValues};
    use crate::outcome::ToolOutcome;
    use crate::tools::{Tool, ToolError, ToolSpec, FORM_RESET_TOOL_NAME};

    struct Clock;

    #[async_trait]
    impl Tool for Clock {
        fn name(&self) -> &str {
            "Clock"
        }
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "Clock".into(),
                description: None,
                input_schema: json!({"type": "object"}),
            }
        }
        async fn call(&self, _args: Value) -> Result<ToolOutcome, ToolError> {
            Ok(ToolOutcome::new("noon"))
        }
    }

    struct Form(&'static str, FormSchema);

    #[async_trait]
    impl FormDefinition for Form {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "does things"
        }
        fn schema(&self) -> &FormSchema {
            &self.1
        }
        async fn execute(&self, _values: &FormValues) -> Result<String, ToolError> {
            Ok("done".into())
        }
    }

    fn form(name: &'static str) -> Arc<dyn FormDefinition> {
        Arc::new(Form(
            name,
            FormSchema::new(name).with_field(FieldSpec::new("x", FieldType::Text, "X")),
        ))
    }

    fn names(tools: &[AvailableTool]) -> Vec<String> {
        tools.iter().map(AvailableTool::name).collect()
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new()
            .add_form(form("SendEmail"))
            .add_tool(Arc::new(Clock))
            .add_form(form("BookFlight"))
    }

    #[test]
    fn no_active_form_offers_everything() {
        let tools = select_tools(&registry(), &AgentState::default());
        assert_eq!(
            names(&tools),
            vec!["SendEmailStart", "Clock", "BookFlightStart"]
        );
    }

    /// **Scenario**: An active form hides other forms and adds FormReset.
    #[test]
    fn active_form_hides_other_forms() {
        let reg = registry();
        let mut active = FormTool::new(reg.forms().get("SendEmail").unwrap().clone());
        active.activate(&json!({})).unwrap();
        let state = AgentState::new("hi", vec![], Some(active));
        let tools = select_tools(&reg, &state);
        assert_eq!(
            names(&tools),
            vec!["SendEmailUpdate", "Clock", FORM_RESET_TOOL_NAME]
        );
        assert!(tools[0].is_form());
    }

    #[test]
    fn unregistered_active_form_still_offered() {
        let reg = ToolRegistry::new().add_tool(Arc::new(Clock));
        let active = FormTool::new(form("Orphan"));
        let state = AgentState::new("hi", vec![], Some(active));
        assert_eq!(
            names(&select_tools(&reg, &state)),
            vec!["Clock", "OrphanStart", FORM_RESET_TOOL_NAME]
        );
    }
}
