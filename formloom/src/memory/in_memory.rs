//! In-process state store; JSON payloads so it behaves like the persistent one.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{PersistedAgentState, StateStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    payloads: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<PersistedAgentState>, StoreError> {
        let guard = self.payloads.read().await;
        guard
            .get(conversation_id)
            .map(|payload| serde_json::from_str(payload).map_err(StoreError::from))
            .transpose()
    }

    async fn save(
        &self,
        conversation_id: &str,
        state: &PersistedAgentState,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(state)?;
        self.payloads
            .write()
            .await
            .insert(conversation_id.to_string(), payload);
        Ok(())
    }
}
