//! The document a user edits: project root, settings and ordered blocks

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::instance::BlockInstance;
use super::kind::DragType;
use super::registry::KindRegistry;
use super::BlockId;
use crate::kinds::{FILE_KIND_ID, TREE_KIND_ID};
use crate::runtime::migrate::{normalize_document, DocumentRecord};

/// Names left out of every tree unless the user changes it
pub const DEFAULT_GLOBAL_IGNORE: &str =
    ".git, __pycache__, node_modules, .idea, .vscode, .venv, dist, build";

/// Document-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Prefix the output with a tree of the project root
    pub include_tree: bool,
    /// Comma-separated names excluded from every tree
    pub global_ignore: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            include_tree: false,
            global_ignore: DEFAULT_GLOBAL_IGNORE.to_string(),
        }
    }
}

/// How to pick the kind for externally dropped paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropChoice {
    /// Exactly one kind accepts the drop; use it without asking
    Auto(String),
    /// Several kinds accept the drop
    Ask {
        candidates: Vec<String>,
        preselected: Option<String>,
    },
    /// No kind accepts the drop; every kind is offered
    NoMatch { candidates: Vec<String> },
}

/// Ordered list of blocks plus the project they describe
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub project_root: String,
    pub settings: DocumentSettings,
    blocks: Vec<BlockInstance>,
}

impl Document {
    /// A fresh document holding one block of the registry's default kind
    pub fn new(registry: &KindRegistry) -> Self {
        let mut doc = Self::empty();
        if let Some(kind_id) = registry.default_kind_id() {
            doc.add_block(&kind_id, registry);
        }
        doc
    }

    /// A document with no blocks and default settings
    pub fn empty() -> Self {
        Self {
            project_root: String::new(),
            settings: DocumentSettings::default(),
            blocks: Vec::new(),
        }
    }

    /// Rebuild a document from a persisted record of any supported shape
    pub fn from_state(state: &Value, registry: &KindRegistry) -> Self {
        let record = normalize_document(state);
        let blocks = record
            .items
            .iter()
            .map(|item| {
                let mut block = BlockInstance::unconfigured(&item.plugin_id);
                block.apply_record(item, registry);
                block
            })
            .collect();

        Self {
            project_root: record.project_root,
            settings: record.settings,
            blocks,
        }
    }

    /// Persisted record for this document
    pub fn to_record(&self, registry: &KindRegistry) -> DocumentRecord {
        DocumentRecord {
            project_root: self.project_root.clone(),
            settings: self.settings.clone(),
            items: self.blocks.iter().map(|b| b.to_record(registry)).collect(),
        }
    }

    /// Persisted record for this document as JSON
    pub fn get_state(&self, registry: &KindRegistry) -> Value {
        self.to_record(registry).to_value()
    }

    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockInstance> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BlockInstance> {
        self.blocks.iter_mut().find(|b| b.id() == id)
    }

    /// Position of a block in document order
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    /// Append a new block of `kind_id`
    pub fn add_block(&mut self, kind_id: &str, registry: &KindRegistry) -> BlockId {
        let block = BlockInstance::new(kind_id, registry);
        let id = block.id();
        self.blocks.push(block);
        id
    }

    /// Append a block built from a persisted record
    pub fn add_block_from_state(&mut self, state: &Value, registry: &KindRegistry) -> BlockId {
        let block = BlockInstance::from_state(state, registry);
        let id = block.id();
        self.blocks.push(block);
        id
    }

    pub fn push_block(&mut self, block: BlockInstance) -> BlockId {
        let id = block.id();
        self.blocks.push(block);
        id
    }

    pub fn remove_block(&mut self, id: BlockId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.blocks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Move the block at `from` so that it ends up at index `to`
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        if from >= self.blocks.len() || to >= self.blocks.len() {
            return false;
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        true
    }

    /// Drop every block; root and settings are kept
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn set_project_root(&mut self, root: impl Into<String>) {
        self.project_root = root.into();
    }

    /// Whether the project root names an existing directory
    pub fn has_valid_root(&self) -> bool {
        !self.project_root.is_empty() && Path::new(&self.project_root).is_dir()
    }

    /// Pick the kind to create for a set of dropped paths
    pub fn choose_drop_kind(paths: &[PathBuf], registry: &KindRegistry) -> DropChoice {
        let has_files = paths.iter().any(|p| p.is_file());
        let has_folders = paths.iter().any(|p| p.is_dir());

        let candidates: Vec<String> = registry
            .all_kinds()
            .iter()
            .filter(|k| !has_folders || k.accepts(DragType::Folder))
            .filter(|k| !has_files || k.accepts(DragType::File))
            .map(|k| k.id().to_string())
            .collect();

        match candidates.len() {
            0 => DropChoice::NoMatch {
                candidates: registry.list().into_iter().map(|(_, id)| id).collect(),
            },
            1 => DropChoice::Auto(candidates[0].clone()),
            _ => {
                let preferred = if has_folders {
                    Some(TREE_KIND_ID)
                } else if has_files {
                    Some(FILE_KIND_ID)
                } else {
                    None
                };
                let preselected = preferred
                    .filter(|id| candidates.iter().any(|c| c == id))
                    .map(str::to_string);
                DropChoice::Ask {
                    candidates,
                    preselected,
                }
            }
        }
    }

    /// Append one `kind_id` block per dropped path
    ///
    /// Each block is configured with `{path}`; the kind fills in the rest.
    pub fn add_dropped_paths(&mut self, paths: &[PathBuf], kind_id: &str, registry: &KindRegistry) -> usize {
        for path in paths {
            let state = json!({
                "plugin_id": kind_id,
                "data": { "path": path.to_string_lossy() },
            });
            let id = self.add_block_from_state(&state, registry);
            debug!(block = %id, path = %path.display(), kind = %kind_id, "added dropped path");
        }
        info!(count = paths.len(), kind = %kind_id, "added dropped items");
        paths.len()
    }
}
