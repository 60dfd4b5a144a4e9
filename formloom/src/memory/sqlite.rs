//! SQLite-backed state store. Persistent across process restarts.
//!
//! One row per conversation; the payload is the JSON of [`PersistedAgentState`].
//! Every call opens its own connection inside `spawn_blocking`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

use super::store::{PersistedAgentState, StateStore, StoreError};

fn storage(e: impl std::fmt::Display) -> StoreError {
    StoreError::Storage(e.to_string())
}

pub struct SqliteStateStore {
    db_path: PathBuf,
}

impl SqliteStateStore {
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS conversations (
                conversation_id TEXT PRIMARY KEY NOT NULL,
                payload TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<PersistedAgentState>, StoreError> {
        let db_path = self.db_path.clone();
        let id = conversation_id.to_string();
        let payload = tokio::task::spawn_blocking(move || -> Result<Option<String>, StoreError> {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.query_row(
                "SELECT payload FROM conversations WHERE conversation_id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)??;

        payload
            .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
            .transpose()
    }

    async fn save(
        &self,
        conversation_id: &str,
        state: &PersistedAgentState,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(state)?;
        let updated_at = chrono::Utc::now().to_rfc3339();
        let db_path = self.db_path.clone();
        let id = conversation_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                r#"
                INSERT OR REPLACE INTO conversations (conversation_id, payload, updated_at)
                VALUES (?1, ?2, ?3)
                "#,
                params![id, payload, updated_at],
            )
            .map_err(storage)?;
            Ok::<(), StoreError>(())
        })
        .await
        .map_err(storage)?
    }
}
