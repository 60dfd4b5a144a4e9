//! Conversation runner: one user message in, one reply out, state persisted between.
//!
//! Turns of the same conversation are serialized by a per-id lock; different
//! conversations run concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::agent::{parse_output, FormAgent};
use crate::error::AgentError;
use crate::form::FormTool;
use crate::memory::{StateStore, StoreError, DEFAULT_HISTORY_LENGTH};
use crate::state::AgentState;

/// Reply shown when a turn fails.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of one successful turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReply {
    pub reply: String,
    /// Name of the form tool left active for the next turn, as the planner sees it.
    pub active_form: Option<String>,
    /// Tool calls made during the turn that are still in the scratchpad.
    pub steps: usize,
}

/// Loads state, runs the [`FormAgent`], saves state.
///
/// Nothing is written when the turn fails, so a retry starts from the same state.
pub struct ConversationRunner {
    agent: FormAgent,
    store: Arc<dyn StateStore>,
    locks: DashMap<String, Arc<Mutex<()>>>,
    history_length: usize,
}

impl ConversationRunner {
    pub fn new(agent: FormAgent, store: Arc<dyn StateStore>) -> Self {
        Self {
            agent,
            store,
            locks: DashMap::new(),
            history_length: DEFAULT_HISTORY_LENGTH,
        }
    }

    /// History window (exchanges) for conversations created by this runner.
    pub fn with_history_length(mut self, history_length: usize) -> Self {
        self.history_length = history_length;
        self
    }

    pub fn agent(&self) -> &FormAgent {
        &self.agent
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    fn lock_for(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the conversation's lock entry unless another turn holds or awaits it.
    ///
    /// Clones of the lock are only taken under the map's shard lock, so a count of one
    /// means nobody else can reach this mutex.
    fn release_lock(&self, conversation_id: &str, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.locks
            .remove_if(conversation_id, |_, l| Arc::strong_count(l) == 1);
    }

    /// Runs one turn of `conversation_id` with the user's `text`.
    pub async fn handle_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Result<TurnReply, RunError> {
        let lock = self.lock_for(conversation_id);
        let result = {
            let _guard = lock.lock().await;
            self.run_turn(conversation_id, text).await
        };
        self.release_lock(conversation_id, lock);
        result
    }

    async fn run_turn(&self, conversation_id: &str, text: &str) -> Result<TurnReply, RunError> {
        let mut persisted = self
            .store
            .load_or_default(conversation_id, self.history_length)
            .await?;
        let active = persisted
            .active_form_tool
            .as_ref()
            .and_then(|snapshot| match self.agent.registry().forms().restore(snapshot) {
                Ok(tool) => Some(tool),
                Err(e) => {
                    warn!(conversation_id, error = %e, "dropping stored form tool");
                    None
                }
            });
        info!(
            conversation_id,
            active_form = ?active.as_ref().map(FormTool::name),
            "turn start"
        );

        let state = AgentState::new(text, persisted.memory.history().to_vec(), active);
        let result = match self.agent.invoke(state).await {
            Ok(result) => result,
            Err(e) => {
                warn!(conversation_id, error = %e, "turn failed");
                return Err(e.into());
            }
        };

        let reply = parse_output(&result).unwrap_or_else(|| FALLBACK_REPLY.to_string());
        persisted.memory.save_context(text, reply.clone());
        persisted.active_form_tool = result.active_form_tool.as_ref().map(FormTool::snapshot);
        self.store.save(conversation_id, &persisted).await?;

        let active_form = result.active_form_tool.as_ref().map(FormTool::name);
        info!(conversation_id, active_form = ?active_form, "turn complete");
        Ok(TurnReply {
            reply,
            active_form,
            steps: result.intermediate_steps.len(),
        })
    }
}
