//! Core block abstractions and types
//!
//! This module defines the kind contract, the configuration bag blocks carry,
//! the kind registry, block instances and the document that orders them.

pub mod state;
pub mod kind;
pub mod registry;
pub mod instance;
pub mod document;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use document::{Document, DocumentSettings, DropChoice};
pub use instance::{BlockInstance, BlockOutput, BlockPhase};
pub use kind::{BlockError, BlockKind, CompileContext, DragType, KindMetadata};
pub use registry::{KindRegistry, PluginLoadReport, RegistryError};
pub use state::{BlockState, ConfigOutcome, ConfigReader};

/// Unique identifier for a block instance within a document
///
/// Ids live only in memory; they are not part of the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Generate a new random block ID
    pub fn new() -> Self {
        BlockId(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
