//! Block kind trait and related types
//!
//! This module defines the `BlockKind` trait that every kind of block
//! implements, along with supporting types for metadata, compile context and
//! error handling.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::state::{BlockState, ConfigOutcome};

/// Core trait that all block kinds implement
///
/// A kind owns the shape of its configuration: nothing outside the kind reads
/// configuration keys directly.
pub trait BlockKind: Send + Sync {
    /// Get kind metadata
    fn metadata(&self) -> &KindMetadata;

    /// Configuration of a freshly created block
    fn init_config(&self) -> BlockState;

    /// Payload persisted under `data` for this configuration
    fn get_config(&self, state: &BlockState) -> Value {
        state.to_value()
    }

    /// Normalize an untrusted payload into this kind's canonical configuration
    ///
    /// Unknown keys are ignored and missing or malformed keys take their
    /// defaults; every substitution is reported in the outcome.
    fn set_config(&self, raw: &Value) -> ConfigOutcome;

    /// Render the configuration into prompt text
    fn compile(&self, state: &BlockState, ctx: &CompileContext<'_>) -> Result<String, BlockError>;

    fn id(&self) -> &str {
        &self.metadata().id
    }

    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Whether external drops of this payload type can create this kind
    fn accepts(&self, drag: DragType) -> bool {
        self.metadata().drag_types.contains(&drag)
    }
}

/// Kind metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindMetadata {
    /// Unique, stable kind identifier; used as persistence key
    pub id: String,
    /// Human-readable kind name
    pub name: String,
    /// Brief description of the kind
    pub description: String,
    /// Kind version
    pub version: String,
    /// External drop payloads this kind accepts
    pub drag_types: Vec<DragType>,
    /// Minimum display height (presentation only)
    pub min_height: u32,
}

/// External drag-and-drop payload types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragType {
    /// A regular file
    File,
    /// A directory
    Folder,
}

impl DragType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DragType::File => "file",
            DragType::Folder => "folder",
        }
    }
}

impl fmt::Display for DragType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DragType {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(DragType::File),
            "folder" => Ok(DragType::Folder),
            other => Err(BlockError::Configuration(format!("unknown drag type `{}`", other))),
        }
    }
}

/// Document-level inputs available to a kind while compiling
#[derive(Debug, Clone, Copy)]
pub struct CompileContext<'a> {
    /// Project root used for relative path display; may be empty
    pub project_root: &'a str,
    /// Comma-separated names excluded from every tree rendering
    pub global_ignore: &'a str,
}

impl<'a> CompileContext<'a> {
    pub fn new(project_root: &'a str, global_ignore: &'a str) -> Self {
        Self {
            project_root,
            global_ignore,
        }
    }
}

/// Block errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BlockError {
    /// Configuration could not be interpreted
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Template rendering failed
    #[error("Template error: {0}")]
    Template(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BlockError {
    fn from(error: std::io::Error) -> Self {
        BlockError::Io(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_type_parse_and_display() {
        assert_eq!("file".parse::<DragType>().unwrap(), DragType::File);
        assert_eq!("folder".parse::<DragType>().unwrap(), DragType::Folder);
        assert!("socket".parse::<DragType>().is_err());
        assert_eq!(DragType::Folder.to_string(), "folder");
    }

    #[test]
    fn test_drag_type_serde_is_lowercase() {
        let json = serde_json::to_string(&vec![DragType::File, DragType::Folder]).unwrap();
        assert_eq!(json, r#"["file","folder"]"#);
    }

    #[test]
    fn test_io_error_conversion() {
        let err: BlockError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.to_string(), "IO error: gone");
    }
}
