//! Prompt Builder - Block composition engine for LLM prompts
//!
//! A document is an ordered list of blocks (free text, a file's content, a
//! directory tree with injected files, or a kind loaded from a plugin
//! manifest). Compiling a document concatenates every enabled block's output
//! into one prompt. Documents are saved by name in SQLite or exchanged as JSON.

pub mod config;
pub mod core;
pub mod kinds;
pub mod render;
pub mod runtime;
pub mod store;
pub mod telemetry;
mod tests;

// Re-export commonly used types
pub use crate::core::{BlockId, BlockInstance, BlockKind, Document, KindRegistry};
pub use crate::runtime::{compile_document, CompiledPrompt, Compiler};
pub use crate::store::PromptStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
