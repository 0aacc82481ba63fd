//! Document compilation
//!
//! Concatenates the output of every block, optionally prefixed with a tree of
//! the project root. Compilation reads the filesystem on every call and never
//! writes; the same document over the same filesystem yields the same text.

use std::path::Path;
use tracing::{debug, warn};

use crate::core::document::Document;
use crate::core::instance::BlockOutput;
use crate::core::kind::CompileContext;
use crate::core::registry::KindRegistry;
use crate::render::TreeRenderer;

/// Width of the rule separating the project structure from the blocks
const SEPARATOR_WIDTH: usize = 30;

/// Counters gathered while compiling a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileDiagnostics {
    /// Blocks that contributed text
    pub compiled: usize,
    /// Blocks that were disabled, unconfigured or produced only whitespace
    pub skipped: usize,
    /// Blocks whose kind is not registered
    pub missing_kinds: usize,
    /// Blocks replaced by an error marker
    pub errors: usize,
    /// Directories the project structure walk could not read
    pub tree_walk_errors: usize,
}

impl CompileDiagnostics {
    pub fn is_clean(&self) -> bool {
        self.missing_kinds == 0 && self.errors == 0 && self.tree_walk_errors == 0
    }
}

/// Output of a compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledPrompt {
    pub text: String,
    pub diagnostics: CompileDiagnostics,
}

impl CompiledPrompt {
    /// Length of the prompt in characters, not bytes
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Compiles documents against a kind registry
pub struct Compiler<'a> {
    registry: &'a KindRegistry,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a KindRegistry) -> Self {
        Self { registry }
    }

    pub fn compile(&self, document: &Document) -> CompiledPrompt {
        let mut diagnostics = CompileDiagnostics::default();
        let mut pieces: Vec<String> = Vec::new();

        if document.settings.include_tree && document.has_valid_root() {
            let rendered = TreeRenderer::new(&document.settings.global_ignore)
                .render(Path::new(&document.project_root));
            diagnostics.tree_walk_errors = rendered.walk_errors.len();
            pieces.push(format!(
                "PROJECT STRUCTURE:\n```\n{}\n```\n{}",
                rendered.text,
                "-".repeat(SEPARATOR_WIDTH)
            ));
        } else if document.settings.include_tree {
            warn!(root = %document.project_root, "project structure requested without a valid project root");
        }

        let ctx = CompileContext::new(&document.project_root, &document.settings.global_ignore);
        for block in document.blocks() {
            let output = block.compile(&ctx, self.registry);
            match &output {
                BlockOutput::Missing(_) => diagnostics.missing_kinds += 1,
                BlockOutput::Failed { .. } => diagnostics.errors += 1,
                _ => {}
            }

            let text = output.into_text();
            if text.trim().is_empty() {
                diagnostics.skipped += 1;
            } else {
                diagnostics.compiled += 1;
                pieces.push(text);
            }
        }

        debug!(
            blocks = document.len(),
            compiled = diagnostics.compiled,
            skipped = diagnostics.skipped,
            "document compiled"
        );

        CompiledPrompt {
            text: pieces.join("\n"),
            diagnostics,
        }
    }
}

/// Compile `document` with `registry`
pub fn compile_document(document: &Document, registry: &KindRegistry) -> CompiledPrompt {
    Compiler::new(registry).compile(document)
}
