//! Registered form definitions, looked up by name when tools are listed or restored.

use std::sync::Arc;

use thiserror::Error;

use super::definition::FormDefinition;
use super::schema::ValidationError;
use super::state::FormToolState;
use super::tool::{FormTool, FormToolSnapshot};

/// A snapshot could not be turned back into a [`FormTool`].
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("unknown form: {0}")]
    UnknownForm(String),
    #[error("stored values for form {form} are no longer valid: {source}")]
    InvalidValues {
        form: String,
        #[source]
        source: ValidationError,
    },
}

/// Ordered set of form definitions; names are unique.
#[derive(Clone, Default)]
pub struct FormRegistry {
    definitions: Vec<Arc<dyn FormDefinition>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one with the same name in place.
    pub fn register(&mut self, definition: Arc<dyn FormDefinition>) {
        match self
            .definitions
            .iter_mut()
            .find(|d| d.name() == definition.name())
        {
            Some(slot) => *slot = definition,
            None => self.definitions.push(definition),
        }
    }

    pub fn with_form(mut self, definition: Arc<dyn FormDefinition>) -> Self {
        self.register(definition);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FormDefinition>> {
        self.definitions.iter().find(|d| d.name() == name)
    }

    pub fn definitions(&self) -> &[Arc<dyn FormDefinition>] {
        &self.definitions
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name()).collect()
    }

    /// Rebuilds a tool from a snapshot, re-validating the stored values against the
    /// current schema.
    pub fn restore(&self, snapshot: &FormToolSnapshot) -> Result<FormTool, RestoreError> {
        let definition = self
            .get(&snapshot.form_name)
            .cloned()
            .ok_or_else(|| RestoreError::UnknownForm(snapshot.form_name.clone()))?;
        if snapshot.state == FormToolState::Inactive {
            return Ok(FormTool::new(definition));
        }
        let values = match &snapshot.values {
            Some(values) => Some(definition.schema().validate_partial(values).map_err(
                |source| RestoreError::InvalidValues {
                    form: snapshot.form_name.clone(),
                    source,
                },
            )?),
            None => None,
        };
        Ok(FormTool::from_parts(definition, snapshot.state, values))
    }
}

impl std::fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
