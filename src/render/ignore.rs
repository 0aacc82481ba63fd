//! Ignore lists and `.gitignore` import
//!
//! Ignore lists are stored as one comma-separated string. The tree renderer
//! matches entries literally against file names; the injection picker treats
//! them as globs (see `render::glob`).

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const GITIGNORE_FILE: &str = ".gitignore";

/// Split a comma-separated ignore list into trimmed, non-empty entries
pub fn split_patterns(csv: &str) -> impl Iterator<Item = &str> {
    csv.split(',').map(str::trim).filter(|p| !p.is_empty())
}

/// Combine the document-wide list with a block's own list
pub fn combine_patterns(global: &str, local: &str) -> String {
    format!("{}, {}", global, local)
}

/// Set of literal names excluded from a tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    names: BTreeSet<String>,
}

impl IgnoreSet {
    pub fn parse(csv: &str) -> Self {
        Self {
            names: split_patterns(csv).map(str::to_string).collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Hidden entries are always excluded, in addition to the listed names
    pub fn excludes(&self, name: &str) -> bool {
        is_hidden(name) || self.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Nearest `.gitignore` at or above `start`
pub fn find_gitignore(start: &Path) -> Option<PathBuf> {
    let start = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(start)
    };

    start
        .ancestors()
        .map(|dir| dir.join(GITIGNORE_FILE))
        .find(|candidate| candidate.is_file())
}

/// Non-empty, non-comment lines of a `.gitignore`
pub fn parse_gitignore(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Append the patterns not already present to `current`
///
/// Returns the merged list and how many patterns were added.
pub fn merge_patterns(current: &str, new_patterns: &[String]) -> (String, usize) {
    let mut merged: Vec<String> = split_patterns(current).map(str::to_string).collect();
    let mut added = 0;
    for pattern in new_patterns {
        if !merged.contains(pattern) {
            merged.push(pattern.clone());
            added += 1;
        }
    }
    (merged.join(", "), added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_drops_empty() {
        let set = IgnoreSet::parse(" target , ,node_modules,, dist ");
        assert_eq!(set.len(), 3);
        assert!(set.contains("target"));
        assert!(set.contains("dist"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_literal_matching_only() {
        let set = IgnoreSet::parse("*.log");
        assert!(set.contains("*.log"));
        assert!(!set.excludes("debug.log"));
    }

    #[test]
    fn test_hidden_always_excluded() {
        let set = IgnoreSet::parse("");
        assert!(set.is_empty());
        assert!(set.excludes(".git"));
        assert!(!set.excludes("src"));
    }

    #[test]
    fn test_combine() {
        let combined = combine_patterns("a, b", "c");
        assert_eq!(IgnoreSet::parse(&combined).len(), 3);
        assert_eq!(IgnoreSet::parse(&combine_patterns("", "")).len(), 0);
    }

    #[test]
    fn test_gitignore_discovery_and_parse() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(GITIGNORE_FILE),
            "# build output\ntarget/\n\n  *.log  \nnode_modules\n",
        )
        .unwrap();
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let found = find_gitignore(&nested).unwrap();
        assert_eq!(found, dir.path().join(GITIGNORE_FILE));

        let patterns = parse_gitignore(&found).unwrap();
        assert_eq!(patterns, vec!["target/", "*.log", "node_modules"]);
    }

    #[test]
    fn test_merge_patterns() {
        let (merged, added) = merge_patterns(
            ".git, node_modules",
            &["node_modules".to_string(), "target".to_string()],
        );
        assert_eq!(merged, ".git, node_modules, target");
        assert_eq!(added, 1);

        let (merged, added) = merge_patterns("", &[]);
        assert_eq!(merged, "");
        assert_eq!(added, 0);
    }
}
