//! Tool outcome: the typed result a tool hands back to the execution graph.
//!
//! The tool node merges [`ToolOutcome::state_update`] into [`AgentState`] with
//! last-write-wins semantics; nothing here accumulates. Intermediate steps are
//! appended by the graph itself.

use crate::form::FormTool;
use crate::state::AgentState;

/// AgentState keys a tool may overwrite. `None` leaves the key untouched;
/// `Some(None)` clears it.
#[derive(Clone, Debug, Default)]
pub struct StateUpdate {
    pub active_form_tool: Option<Option<FormTool>>,
    pub tool_choice: Option<Option<String>>,
}

impl StateUpdate {
    pub fn is_empty(&self) -> bool {
        self.active_form_tool.is_none() && self.tool_choice.is_none()
    }

    /// Overwrites every key this update sets.
    pub fn apply(self, state: &mut AgentState) {
        if let Some(tool) = self.active_form_tool {
            state.active_form_tool = tool;
        }
        if let Some(choice) = self.tool_choice {
            state.tool_choice = choice;
        }
    }
}

/// Output text, state changes and the direct-return flag of one tool call.
#[derive(Clone, Debug, Default)]
pub struct ToolOutcome {
    /// Natural-language result, shown to the planner (or the user when returned directly).
    pub output: String,
    pub state_update: StateUpdate,
    /// Skip further planner turns and answer the user with `output`.
    pub return_direct: bool,
}

impl ToolOutcome {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }

    /// Sets (or with `None`, clears) the conversation's active form tool.
    pub fn with_active_form_tool(mut self, tool: Option<FormTool>) -> Self {
        self.state_update.active_form_tool = Some(tool);
        self
    }

    /// Forces (or with `None`, releases) the planner's next tool choice.
    pub fn with_tool_choice(mut self, name: Option<String>) -> Self {
        self.state_update.tool_choice = Some(name);
        self
    }

    pub fn with_return_direct(mut self, return_direct: bool) -> Self {
        self.return_direct = return_direct;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Set keys overwrite, unset keys are left alone.
    #[test]
    fn apply_is_last_write_wins() {
        let mut state = AgentState::new("hi", vec![], None);
        state.tool_choice = Some("Old".into());

        ToolOutcome::new("x")
            .with_tool_choice(Some("New".into()))
            .state_update
            .apply(&mut state);
        assert_eq!(state.tool_choice.as_deref(), Some("New"));

        let untouched = ToolOutcome::new("y");
        assert!(untouched.state_update.is_empty());
        untouched.state_update.apply(&mut state);
        assert_eq!(state.tool_choice.as_deref(), Some("New"));

        ToolOutcome::new("z")
            .with_tool_choice(None)
            .state_update
            .apply(&mut state);
        assert!(state.tool_choice.is_none());
    }

    #[test]
    fn builder_defaults() {
        let o = ToolOutcome::new("done");
        assert_eq!(o.output, "done");
        assert!(!o.return_direct);
        assert!(o.with_return_direct(true).return_direct);
    }
}
