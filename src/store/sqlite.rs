//! SQLite store for named prompts
//!
//! One row per name; saving an existing name replaces its document. Every
//! operation opens its own connection so the database file can be switched or
//! edited externally between calls.

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{SaveOutcome, StoreError};

/// Database used when nothing else is configured
pub const DEFAULT_DB_PATH: &str = "prompt_builder.db";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS prompts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL,
    data TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Row of the saved-prompt listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPromptSummary {
    pub id: i64,
    pub name: String,
    /// RFC 3339 UTC timestamp of the last save
    pub updated_at: String,
}

/// Handle on a prompt database file
#[derive(Debug, Clone)]
pub struct PromptStore {
    path: PathBuf,
}

impl PromptStore {
    /// Open (creating if needed) the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.init()?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.path
    }

    /// Point the store at another database file and initialize it
    pub fn switch_database<P: AsRef<Path>>(&mut self, path: P) -> Result<(), StoreError> {
        let previous = std::mem::replace(&mut self.path, path.as_ref().to_path_buf());
        if let Err(e) = self.init() {
            self.path = previous;
            return Err(e);
        }
        info!(db = %self.path.display(), "switched prompt database");
        Ok(())
    }

    fn init(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(Connection::open(&self.path)?)
    }

    /// Insert or replace the document saved under `name`
    pub fn save(&self, name: &str, document: &Value) -> SaveOutcome {
        match self.try_save(name, document) {
            Ok(()) => {
                info!(name = %name, "prompt saved");
                SaveOutcome::saved()
            }
            Err(e) => {
                warn!(name = %name, error = %e, "failed to save prompt");
                SaveOutcome::failed(e.to_string())
            }
        }
    }

    fn try_save(&self, name: &str, document: &Value) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        let data = serde_json::to_string(document)?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO prompts (name, data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                 data = excluded.data,
                 updated_at = excluded.updated_at",
            params![name, data, timestamp()],
        )?;
        Ok(())
    }

    /// Document saved under `name`, if any
    pub fn load(&self, name: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.connect()?;
        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM prompts WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => {
                debug!(name = %name, "no saved prompt with this name");
                Ok(None)
            }
        }
    }

    /// Every saved prompt, most recently saved first
    pub fn list(&self) -> Result<Vec<SavedPromptSummary>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, updated_at FROM prompts ORDER BY updated_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SavedPromptSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete the prompt saved under `name`; false when there was none
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let conn = self.connect()?;
        let removed = conn.execute("DELETE FROM prompts WHERE name = ?1", params![name])?;
        Ok(removed > 0)
    }
}

/// Fixed-width timestamp so text ordering matches time ordering
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
