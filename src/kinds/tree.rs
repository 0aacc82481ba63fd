//! Folder tree block: a directory listing plus optionally injected files

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use crate::core::kind::{BlockError, BlockKind, CompileContext, DragType, KindMetadata};
use crate::core::state::{BlockState, ConfigOutcome, ConfigReader};
use crate::render::{combine_patterns, fenced_file, format_path, read_file_content, PathMode, TreeRenderer};

use super::{with_note, TREE_KIND_ID};

/// Ignore list of a newly created tree block
pub const DEFAULT_TREE_IGNORE: &str = ".git, __pycache__, node_modules";

const INJECTED_HEADER: &str = "\n# --- Context Files for Tree ---\n";
const TREE_MODES: [&str; 2] = ["Relative Path", "Full Path"];

/// Canonical configuration of a folder tree block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub path: String,
    pub mode: PathMode,
    #[serde(rename = "text")]
    pub note: String,
    /// Comma-separated names excluded in addition to the document's list
    pub ignore: String,
    /// Files below `path` appended after the tree, in selection order
    pub inject: Vec<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            mode: PathMode::RelativePath,
            note: String::new(),
            ignore: DEFAULT_TREE_IGNORE.to_string(),
            inject: Vec::new(),
        }
    }
}

impl TreeConfig {
    pub fn from_state(state: &BlockState) -> Result<Self, BlockError> {
        serde_json::from_value(state.to_value())
            .map_err(|e| BlockError::Configuration(e.to_string()))
    }

    pub fn to_state(&self) -> BlockState {
        BlockState::from_value(&serde_json::to_value(self).unwrap_or(Value::Null))
    }

    fn render_injected(&self, root: &str) -> Result<String, BlockError> {
        let mut out = String::from(INJECTED_HEADER);
        for rel in &self.inject {
            let full = Path::new(&self.path).join(rel);
            if !full.exists() {
                warn!(tree = %self.path, file = %rel, "injected file no longer exists; skipped");
                continue;
            }
            let display = format_path(&full.to_string_lossy(), self.mode, root);
            let content = read_file_content(&full)?;
            out.push_str(&fenced_file(&format!("File: {}", display), &full, &content));
        }
        Ok(out)
    }
}

pub struct TreeKind {
    metadata: KindMetadata,
}

impl TreeKind {
    pub fn new() -> Self {
        Self {
            metadata: Self::build_metadata(),
        }
    }

    fn build_metadata() -> KindMetadata {
        KindMetadata {
            id: TREE_KIND_ID.into(),
            name: "Folder Tree".into(),
            description: "Directory structure with optional injected files".into(),
            version: "1.0.0".into(),
            drag_types: vec![DragType::Folder],
            min_height: 180,
        }
    }
}

impl Default for TreeKind {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockKind for TreeKind {
    fn metadata(&self) -> &KindMetadata {
        &self.metadata
    }

    fn init_config(&self) -> BlockState {
        TreeConfig::default().to_state()
    }

    fn set_config(&self, raw: &Value) -> ConfigOutcome {
        let mut reader = ConfigReader::new(raw);
        let path = reader.string("path", "");
        let mode = reader.choice("mode", &TREE_MODES, PathMode::RelativePath.label());
        let note = reader.string("text", "");
        let ignore = reader.string("ignore", "");
        let inject = reader.string_set("inject");

        let config = TreeConfig {
            path,
            mode: PathMode::from_label(&mode).unwrap_or(PathMode::RelativePath),
            note,
            ignore,
            inject,
        };
        ConfigOutcome {
            state: config.to_state(),
            warnings: reader.finish(),
        }
    }

    fn compile(&self, state: &BlockState, ctx: &CompileContext<'_>) -> Result<String, BlockError> {
        let config = TreeConfig::from_state(state)?;
        if config.path.is_empty() {
            return Ok("[NO TREE PATH]".to_string());
        }

        let display = format_path(&config.path, config.mode, ctx.project_root);
        let ignore = combine_patterns(ctx.global_ignore, &config.ignore);
        let rendered = TreeRenderer::new(&ignore).render(Path::new(&config.path));
        let header = with_note(format!("Dir: {}", display), &config.note);

        let mut out = format!("\n{}\n```\n{}\n```\n", header, rendered.text);
        if !config.inject.is_empty() {
            out.push_str(&config.render_injected(ctx.project_root)?);
        }
        Ok(out)
    }
}
