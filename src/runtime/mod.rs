//! Document runtime
//!
//! Compilation of documents into prompt text, and migration of persisted
//! records (current and legacy shapes) into canonical form.

pub mod compiler;
pub mod migrate;

pub use compiler::{compile_document, CompileDiagnostics, CompiledPrompt, Compiler};
pub use migrate::{normalize_document, normalize_item, DocumentRecord, ItemRecord};
