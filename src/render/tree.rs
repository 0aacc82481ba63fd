//! ASCII directory tree rendering
//!
//! Output is byte-for-byte reproducible for a given directory: entries are
//! sorted by name at every level and drawn with box connectors.
//!
//! ```text
//! project/
//! ├── src
//! │   └── main.rs
//! └── README.md
//! ```
//!
//! A directory that cannot be read is left out of the tree, recorded as a
//! `WalkError` and logged; rendering never fails.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::ignore::IgnoreSet;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// A directory the walk had to skip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkError {
    pub path: PathBuf,
    pub message: String,
}

/// Rendered tree plus whatever the walk skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTree {
    pub text: String,
    pub walk_errors: Vec<WalkError>,
}

/// Renders directory trees filtered by a literal ignore set
#[derive(Debug, Clone, Default)]
pub struct TreeRenderer {
    ignore: IgnoreSet,
}

impl TreeRenderer {
    pub fn new(ignore_csv: &str) -> Self {
        Self {
            ignore: IgnoreSet::parse(ignore_csv),
        }
    }

    pub fn render(&self, root: &Path) -> RenderedTree {
        let mut rendered = RenderedTree::default();
        if root.as_os_str().is_empty() {
            return rendered;
        }

        let mut lines = vec![format!("{}/", root_label(root))];
        self.walk(root, "", &mut lines, &mut rendered.walk_errors);
        rendered.text = lines.join("\n");
        rendered
    }

    fn walk(&self, dir: &Path, prefix: &str, lines: &mut Vec<String>, errors: &mut Vec<WalkError>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
                errors.push(WalkError {
                    path: dir.to_path_buf(),
                    message: e.to_string(),
                });
                return;
            }
        };

        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !self.ignore.excludes(&name) {
                        names.push(name);
                    }
                }
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                    errors.push(WalkError {
                        path: dir.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }
        names.sort();

        let count = names.len();
        for (index, name) in names.into_iter().enumerate() {
            let is_last = index + 1 == count;
            let connector = if is_last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{}{}{}", prefix, connector, name));

            let full = dir.join(&name);
            if is_walkable_dir(&full) {
                let indent = if is_last { SPACE_INDENT } else { PIPE_INDENT };
                self.walk(&full, &format!("{}{}", prefix, indent), lines, errors);
            }
        }
    }
}

/// Symlinked directories are listed but not descended into
fn is_walkable_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Header name for the root; a filesystem root has none, so its header is `/`
fn root_label(root: &Path) -> String {
    match root.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None if root.parent().is_none() => String::new(),
        None => root.to_string_lossy().into_owned(),
    }
}

/// Render `root` as a tree, excluding hidden entries and the listed names
pub fn render_tree(root: &str, ignore_csv: &str) -> String {
    TreeRenderer::new(ignore_csv).render(Path::new(root)).text
}
