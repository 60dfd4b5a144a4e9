//! Everything the agent was configured with: plain tools and forms, in registration order.

use std::sync::Arc;

use super::available::AvailableTool;
use super::form_reset::FormResetTool;
use super::Tool;
use crate::form::{FormDefinition, FormRegistry, FormTool};

/// Ordered list of registered tools. Form entries are held in their inactive state;
/// the per-turn view is computed by [`select_tools`](crate::select_tools).
#[derive(Clone)]
pub struct ToolRegistry {
    entries: Vec<AvailableTool>,
    forms: FormRegistry,
    reset: Arc<dyn Tool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            forms: FormRegistry::new(),
            reset: Arc::new(FormResetTool),
        }
    }

    /// Registers a plain tool; a tool with the same name is replaced in place.
    pub fn add_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.name().to_string();
        self.upsert(AvailableTool::Base(tool), |e| e.name() == name);
        self
    }

    /// Registers a form; it is offered to the planner as `<name>Start`.
    pub fn add_form(mut self, definition: Arc<dyn FormDefinition>) -> Self {
        let form_name = definition.name().to_string();
        self.forms.register(definition.clone());
        self.upsert(AvailableTool::Form(FormTool::new(definition)), |e| {
            e.as_form().is_some_and(|f| f.form_name() == form_name)
        });
        self
    }

    fn upsert(&mut self, entry: AvailableTool, same: impl Fn(&AvailableTool) -> bool) {
        match self.entries.iter_mut().find(|e| same(e)) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[AvailableTool] {
        &self.entries
    }

    pub fn forms(&self) -> &FormRegistry {
        &self.forms
    }

    /// The universal reset tool appended while a form is active.
    pub fn reset_tool(&self) -> AvailableTool {
        AvailableTool::Base(self.reset.clone())
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("entries", &self.entries)
            .field("forms", &self.forms)
            .finish()
    }
}
