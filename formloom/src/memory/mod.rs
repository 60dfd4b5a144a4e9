//! Conversation memory and the stores that keep it between turns.
//!
//! - [`ConversationMemory`]: windowed chat history.
//! - [`StateStore`]: load/save [`PersistedAgentState`] per conversation id, with
//!   [`InMemoryStateStore`] and [`SqliteStateStore`] implementations.

mod conversation;
mod in_memory;
mod sqlite;
mod store;

pub use conversation::{ConversationMemory, DEFAULT_HISTORY_LENGTH};
pub use in_memory::InMemoryStateStore;
pub use sqlite::SqliteStateStore;
pub use store::{PersistedAgentState, StateStore, StoreError};
