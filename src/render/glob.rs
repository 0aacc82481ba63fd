//! Shell-glob filtering for the injection file picker
//!
//! Unlike the tree renderer, the picker matches ignore entries as shell
//! globs (`*`, `?`, `[seq]`, `[!seq]`) against each entry's name.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use super::ignore::{is_hidden, split_patterns};

/// Compiled set of name globs
#[derive(Debug, Clone)]
pub struct NameGlobs {
    set: GlobSet,
    len: usize,
}

impl NameGlobs {
    /// Parse a comma-separated list
    ///
    /// A pattern that is not a valid glob (an unclosed `[`, say) is matched
    /// literally instead.
    pub fn parse(csv: &str) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut len = 0;
        for pattern in split_patterns(csv) {
            match name_glob(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    len += 1;
                }
                Err(e) => warn!(pattern = %pattern, error = %e, "ignoring invalid glob"),
            }
        }
        let set = builder.build().unwrap_or_else(|e| {
            warn!(error = %e, "ignore globs could not be compiled");
            GlobSet::empty()
        });
        Self { set, len }
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.set.is_match(name)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for NameGlobs {
    fn default() -> Self {
        Self {
            set: GlobSet::empty(),
            len: 0,
        }
    }
}

/// Backslash is an ordinary character in a name glob, as in fnmatch
fn name_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern)
        .backslash_escape(false)
        .build()
        .or_else(|_| GlobBuilder::new(&globset::escape(pattern)).build())
}

/// Regular files under `root` that the picker offers for injection
///
/// Hidden entries and names matching any glob in `ignore_csv` are skipped at
/// every depth. Paths are relative to `root`, in sorted depth-first order.
/// Symlinked directories are not descended into.
pub fn collect_injectable_files(root: &Path, ignore_csv: &str) -> Vec<PathBuf> {
    let globs = NameGlobs::parse(ignore_csv);
    let keep = |entry: &DirEntry| {
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !is_hidden(&name) && !globs.is_match(&name)
    };

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(keep) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 0 || entry.file_type().is_dir() || !entry.path().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            files.push(rel.to_path_buf());
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_star_and_question() {
        let set = NameGlobs::parse("*.log, ?.tmp");
        assert_eq!(set.len(), 2);
        assert!(set.is_match("debug.log"));
        assert!(set.is_match(".log"));
        assert!(set.is_match("a.tmp"));
        assert!(!set.is_match("ab.tmp"));
        assert!(!set.is_match("log.txt"));
    }

    #[test]
    fn test_literal_metacharacters() {
        let set = NameGlobs::parse("a+b.(c), back\\slash");
        assert!(set.is_match("a+b.(c)"));
        assert!(!set.is_match("aab.(c)"));
        assert!(set.is_match("back\\slash"));
    }

    #[test]
    fn test_character_classes() {
        let set = NameGlobs::parse("file[0-9].txt, [!a]*.md");
        assert!(set.is_match("file3.txt"));
        assert!(!set.is_match("filex.txt"));
        assert!(set.is_match("readme.md"));
        assert!(!set.is_match("about.md"));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        let set = NameGlobs::parse("[abc");
        assert!(set.is_match("[abc"));
        assert!(!set.is_match("a"));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let set = NameGlobs::parse(" , ");
        assert!(set.is_empty());
        assert!(!set.is_match("anything"));
    }

    #[test]
    fn test_collect_injectable_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in ["src/lib.rs", "src/gen/out.log", "notes.md", ".hidden/x", "build/artifact"] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }

        let files = collect_injectable_files(root, "*.log, build");
        assert_eq!(
            files,
            vec![PathBuf::from("notes.md"), PathBuf::from("src/lib.rs")]
        );
    }

    #[test]
    fn test_collect_orders_depth_first_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for rel in ["b.txt", "a/z.txt", "a/b/c.txt", "c.txt"] {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }

        let files = collect_injectable_files(root, "");
        assert_eq!(
            files,
            vec![
                PathBuf::from("a/b/c.txt"),
                PathBuf::from("a/z.txt"),
                PathBuf::from("b.txt"),
                PathBuf::from("c.txt"),
            ]
        );
    }

    #[test]
    fn test_collect_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_injectable_files(&dir.path().join("absent"), "").is_empty());
    }
}
