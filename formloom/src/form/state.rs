//! Form tool states and the state-to-identity mapping.
//!
//! A form tool advertises a different name, description and payload in each state, so
//! the planner's tool choice narrows to the one action that makes sense. [`describe`]
//! computes that identity from the definition and the state; nothing is mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::definition::FormDefinition;
use super::schema::{PayloadSchema, PayloadVariant};

/// Lifecycle state of a form tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormToolState {
    /// Not started; the tool only offers to start the form.
    #[default]
    Inactive,
    /// Collecting field values.
    Active,
    /// Every required value collected; waiting for confirmation.
    Filled,
}

impl FormToolState {
    /// Payload shape advertised in this state.
    pub fn payload_variant(self) -> PayloadVariant {
        match self {
            FormToolState::Inactive => PayloadVariant::Inactive,
            FormToolState::Active => PayloadVariant::Optional,
            FormToolState::Filled => PayloadVariant::Confirm,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            FormToolState::Inactive => "Start",
            FormToolState::Active => "Update",
            FormToolState::Filled => "Finalize",
        }
    }
}

impl fmt::Display for FormToolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FormToolState::Inactive => "INACTIVE",
            FormToolState::Active => "ACTIVE",
            FormToolState::Filled => "FILLED",
        };
        f.write_str(s)
    }
}

/// Externally advertised identity of a form tool in one state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolIdentity {
    pub name: String,
    pub description: String,
    pub payload: PayloadSchema,
}

/// Advertised tool name of form `form_name` in `state`, e.g. `SendEmailUpdate`.
pub fn identity_name(form_name: &str, state: FormToolState) -> String {
    format!("{}{}", form_name, state.suffix())
}

/// Computes the name, description and payload a form tool exposes in `state`.
pub fn describe(definition: &dyn FormDefinition, state: FormToolState) -> ToolIdentity {
    let name = identity_name(definition.name(), state);
    let description = match state {
        FormToolState::Inactive => {
            format!("Starts the form {}, which {}", name, definition.description())
        }
        FormToolState::Active => format!(
            "Updates data for form {}, which {}",
            name,
            definition.description()
        ),
        FormToolState::Filled => {
            format!("Finalizes form {}, which {}", name, definition.description())
        }
    };
    ToolIdentity {
        name,
        description,
        payload: definition.schema().payload(state.payload_variant()),
    }
}
