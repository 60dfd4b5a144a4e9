//! Per-conversation persistence of what must survive between turns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::conversation::ConversationMemory;
use crate::form::FormToolSnapshot;

/// State carried from one turn to the next: chat history and the form in progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedAgentState {
    #[serde(default)]
    pub memory: ConversationMemory,
    #[serde(default)]
    pub active_form_tool: Option<FormToolSnapshot>,
}

impl PersistedAgentState {
    /// Empty state with a history window of `history_length` exchanges.
    pub fn new(history_length: usize) -> Self {
        Self {
            memory: ConversationMemory::new(history_length),
            active_form_tool: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Keyed storage of [`PersistedAgentState`].
///
/// **Interaction**: used by [`ConversationRunner`](crate::ConversationRunner), which
/// loads before and saves after each successful turn.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stored state, or `None` for a conversation never saved.
    async fn load(&self, conversation_id: &str) -> Result<Option<PersistedAgentState>, StoreError>;

    /// Replaces the stored state.
    async fn save(
        &self,
        conversation_id: &str,
        state: &PersistedAgentState,
    ) -> Result<(), StoreError>;

    async fn load_or_default(
        &self,
        conversation_id: &str,
        history_length: usize,
    ) -> Result<PersistedAgentState, StoreError> {
        Ok(self
            .load(conversation_id)
            .await?
            .unwrap_or_else(|| PersistedAgentState::new(history_length)))
    }
}
