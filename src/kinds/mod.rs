//! Block kind implementations
//!
//! The built-in kinds (Message, File, Folder Tree) and template kinds loaded
//! from plugin manifests.

pub mod message;
pub mod file;
pub mod tree;
pub mod template;

use std::sync::Arc;
use tracing::error;

use crate::core::registry::KindRegistry;

pub use file::{FileConfig, FileKind};
pub use message::MessageKind;
pub use template::{TemplateKind, TemplateManifest};
pub use tree::{TreeConfig, TreeKind};

pub const MESSAGE_KIND_ID: &str = "core.message";
pub const FILE_KIND_ID: &str = "core.file";
pub const TREE_KIND_ID: &str = "core.tree";

/// Header suffix for a non-empty note
pub(crate) fn with_note(header: String, note: &str) -> String {
    if note.is_empty() {
        header
    } else {
        format!("{} /* {} */", header, note)
    }
}

/// Register Message, File and Folder Tree, in that order
pub fn register_builtin_kinds(registry: &KindRegistry) {
    let builtins: [Arc<dyn crate::core::BlockKind>; 3] = [
        Arc::new(MessageKind::new()),
        Arc::new(FileKind::new()),
        Arc::new(TreeKind::new()),
    ];
    for kind in builtins {
        if let Err(e) = registry.register(kind) {
            error!(error = %e, "failed to register built-in kind");
        }
    }
}
