//! Text rendering helpers shared by the built-in kinds and the compiler
//!
//! Path formatting, tree rendering, ignore lists, glob filtering for the
//! injection picker, and fence language lookup.

pub mod glob;
pub mod ignore;
pub mod language;
pub mod path;
pub mod tree;

use std::fs;
use std::io;
use std::path::Path;

pub use glob::{collect_injectable_files, NameGlobs};
pub use ignore::{combine_patterns, IgnoreSet};
pub use language::language_for_extension;
pub use path::{format_path, PathMode};
pub use tree::{render_tree, RenderedTree, TreeRenderer};

/// Read a file as text; invalid UTF-8 sequences are replaced, not rejected
pub fn read_file_content(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Header, fenced body and closing fence for one file
pub fn fenced_file(header: &str, path: &Path, content: &str) -> String {
    let lang = language_for_extension(&path.to_string_lossy());
    format!("{}\n```{}\n{}\n```\n", header, lang, content)
}
