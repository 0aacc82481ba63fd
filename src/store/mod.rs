//! Persistence of documents
//!
//! Named documents live in a SQLite database (`sqlite`); single documents can
//! also be exported to and imported from JSON files (`json_file`).

pub mod json_file;
pub mod sqlite;

use std::path::PathBuf;

pub use json_file::{export_document, import_document};
pub use sqlite::{PromptStore, SavedPromptSummary, DEFAULT_DB_PATH};

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("prompt name cannot be empty")]
    EmptyName,
}

/// Result of a save; saving reports failure instead of returning an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
}

impl SaveOutcome {
    pub fn saved() -> Self {
        Self {
            success: true,
            message: "Saved successfully.".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
