//! Forms: schema and payload variants, the form tool state machine, and the registry
//! of form definitions.

mod definition;
mod registry;
mod schema;
mod state;
mod tool;

pub use definition::{first_unset_required, FormDefinition};
pub use registry::{FormRegistry, RestoreError};
pub use schema::{
    is_unset, FieldIssue, FieldSpec, FieldType, FieldValidator, FormSchema, FormValidator,
    FormValues, PayloadField, PayloadSchema, PayloadVariant, ValidationError, CONFIRM_FIELD,
};
pub use state::{describe, identity_name, FormToolState, ToolIdentity};
pub use tool::{FormTool, FormToolSnapshot};
