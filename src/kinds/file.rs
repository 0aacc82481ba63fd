//! File block: inlines one file's content in a fenced code block

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::core::kind::{BlockError, BlockKind, CompileContext, DragType, KindMetadata};
use crate::core::state::{BlockState, ConfigOutcome, ConfigReader};
use crate::render::{fenced_file, format_path, read_file_content, PathMode};

use super::{with_note, FILE_KIND_ID};

const FILE_MODES: [&str; 3] = ["Name Only", "Relative Path", "Full Path"];

/// Canonical configuration of a file block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub path: String,
    pub mode: PathMode,
    /// Optional note shown after the header
    #[serde(rename = "text")]
    pub note: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            mode: PathMode::RelativePath,
            note: String::new(),
        }
    }
}

impl FileConfig {
    pub fn from_state(state: &BlockState) -> Result<Self, BlockError> {
        serde_json::from_value(state.to_value())
            .map_err(|e| BlockError::Configuration(e.to_string()))
    }

    pub fn to_state(&self) -> BlockState {
        BlockState::from_value(&serde_json::to_value(self).unwrap_or(Value::Null))
    }
}

pub struct FileKind {
    metadata: KindMetadata,
}

impl FileKind {
    pub fn new() -> Self {
        Self {
            metadata: Self::build_metadata(),
        }
    }

    fn build_metadata() -> KindMetadata {
        KindMetadata {
            id: FILE_KIND_ID.into(),
            name: "File".into(),
            description: "Inlines the content of a single file".into(),
            version: "1.0.0".into(),
            drag_types: vec![DragType::File],
            min_height: 100,
        }
    }
}

impl Default for FileKind {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockKind for FileKind {
    fn metadata(&self) -> &KindMetadata {
        &self.metadata
    }

    fn init_config(&self) -> BlockState {
        FileConfig::default().to_state()
    }

    fn set_config(&self, raw: &Value) -> ConfigOutcome {
        let mut reader = ConfigReader::new(raw);
        let path = reader.string("path", "");
        let mode = reader.choice("mode", &FILE_MODES, PathMode::RelativePath.label());
        let note = reader.string("text", "");

        let config = FileConfig {
            path,
            mode: PathMode::from_label(&mode).unwrap_or(PathMode::RelativePath),
            note,
        };
        ConfigOutcome {
            state: config.to_state(),
            warnings: reader.finish(),
        }
    }

    fn compile(&self, state: &BlockState, ctx: &CompileContext<'_>) -> Result<String, BlockError> {
        let config = FileConfig::from_state(state)?;
        let path = Path::new(&config.path);
        if config.path.is_empty() || !path.exists() {
            return Ok(format!("[FILE NOT FOUND: {}]", config.path));
        }

        let display = format_path(&config.path, config.mode, ctx.project_root);
        let header = with_note(format!("File: {}", display), &config.note);
        let content = read_file_content(path)?;
        Ok(format!("\n{}", fenced_file(&header, path, &content)))
    }
}
