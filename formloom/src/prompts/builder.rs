//! Builds the planner request for one agent step.
//!
//! Message order: persona, optional instruction, chat history, user input, scratchpad.
//! The scratchpad replays each recorded step as a tool call plus its tool result, paired
//! by the provider's call id (`call_<n>` when the planner gave none).
//! The instruction is chosen by [`InstructionKind`] in priority order: pending error,
//! then active form (collect a field or confirm), then none.

use chrono::{Local, NaiveDateTime};
use serde_json::Value;

use super::FormAgentPrompts;
use crate::form::{is_unset, FormTool};
use crate::state::{AgentState, Message};
use crate::tools::{AvailableTool, ToolSpec};

const NOW_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which state-specific instruction the request carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstructionKind {
    Default,
    Error,
    CollectField,
    Confirm,
}

/// Everything the planner needs for one decision.
#[derive(Clone, Debug)]
pub struct PlannerRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    /// Tool the planner must call; always one of `tools`.
    pub tool_choice: Option<String>,
    pub kind: InstructionKind,
}

/// Replaces `{key}` placeholders in one left-to-right pass. Inserted values are never
/// scanned again; unknown placeholders stay as written.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let replaced = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match replaced {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `- field: <json>` for every set value, in declaration order.
fn collected_values(tool: &FormTool) -> String {
    let Some(form) = tool.form() else {
        return String::new();
    };
    tool.definition()
        .schema()
        .fields()
        .iter()
        .filter_map(|f| {
            let value = form.get(f.name());
            if is_unset(value) {
                return None;
            }
            let rendered = value.map(Value::to_string).unwrap_or_default();
            Some(format!("- {}: {}", f.name(), rendered))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Turns [`AgentState`] plus the visible tools into a [`PlannerRequest`].
#[derive(Clone, Debug)]
pub struct PlannerPromptBuilder {
    prompts: FormAgentPrompts,
    fixed_now: Option<NaiveDateTime>,
}

impl PlannerPromptBuilder {
    pub fn new(prompts: FormAgentPrompts) -> Self {
        Self {
            prompts,
            fixed_now: None,
        }
    }

    /// Pins the datetime shown in the persona (tests, replays).
    pub fn with_fixed_now(mut self, now: NaiveDateTime) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn prompts(&self) -> &FormAgentPrompts {
        &self.prompts
    }

    fn now(&self) -> String {
        self.fixed_now
            .unwrap_or_else(|| Local::now().naive_local())
            .format(NOW_FORMAT)
            .to_string()
    }

    fn instruction(&self, state: &AgentState) -> (InstructionKind, Option<String>) {
        if let Some(error) = &state.error {
            let text = fill_template(&self.prompts.error_prompt, &[("error", error)]);
            return (InstructionKind::Error, Some(text));
        }
        let Some(active) = &state.active_form_tool else {
            return (InstructionKind::Default, None);
        };
        let tool = active.name();
        match active.next_field_to_collect() {
            Some(field) => (
                InstructionKind::CollectField,
                Some(fill_template(
                    &self.prompts.collect_field_prompt,
                    &[("tool", &tool), ("field", &field)],
                )),
            ),
            None => {
                let info = collected_values(active);
                (
                    InstructionKind::Confirm,
                    Some(fill_template(
                        &self.prompts.confirm_prompt,
                        &[("tool", &tool), ("info", &info)],
                    )),
                )
            }
        }
    }

    pub fn build(&self, state: &AgentState, tools: &[AvailableTool]) -> PlannerRequest {
        let now = self.now();
        let mut messages = vec![Message::system(fill_template(
            &self.prompts.base_prompt,
            &[("now", &now)],
        ))];
        let (kind, instruction) = self.instruction(state);
        messages.extend(instruction.map(Message::system));
        messages.extend(state.chat_history.iter().cloned());
        messages.push(Message::user(state.input.clone()));
        for (i, step) in state.intermediate_steps.iter().enumerate() {
            let id = step
                .invocation
                .id
                .clone()
                .unwrap_or_else(|| format!("call_{}", i));
            messages.push(Message::tool_call(
                id.clone(),
                step.invocation.tool.clone(),
                step.invocation.input.to_string(),
            ));
            messages.push(Message::tool_result(id, step.observation.clone()));
        }

        let specs: Vec<ToolSpec> = tools.iter().map(AvailableTool::spec).collect();
        let tool_choice = state
            .tool_choice
            .as_ref()
            .filter(|name| specs.iter().any(|s| &s.name == *name))
            .cloned();

        PlannerRequest {
            messages,
            tools: specs,
            tool_choice,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_template_is_single_pass() {
        let out = fill_template("a {x} b {y} {unknown}", &[("x", "{y}"), ("y", "2")]);
        assert_eq!(out, "a {y} b 2 {unknown}");
        assert_eq!(fill_template("no close {x", &[("x", "1")]), "no close {x");
        assert_eq!(fill_template("{{x}}", &[("x", "1")]), "{1}");
    }
}
