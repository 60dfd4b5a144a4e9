//! Planner prompts: YAML templates ([`load`]) and the request builder ([`builder`]).

mod builder;
mod load;

pub use builder::{fill_template, InstructionKind, PlannerPromptBuilder, PlannerRequest};
pub use load::{default_from_embedded, load, load_or_default, LoadError};

/// Resolved prompt templates.
///
/// Placeholders: `{now}` (base), `{error}` (error), `{tool}` and `{field}` (collect
/// field), `{tool}` and `{info}` (confirm).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormAgentPrompts {
    pub base_prompt: String,
    pub error_prompt: String,
    pub collect_field_prompt: String,
    pub confirm_prompt: String,
}

impl FormAgentPrompts {
    fn empty() -> Self {
        Self {
            base_prompt: String::new(),
            error_prompt: String::new(),
            collect_field_prompt: String::new(),
            confirm_prompt: String::new(),
        }
    }
}

impl Default for FormAgentPrompts {
    fn default() -> Self {
        default_from_embedded()
    }
}
