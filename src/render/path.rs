//! Path display formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// How a path is shown in compiled output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathMode {
    /// Last path segment only
    #[serde(rename = "Name Only")]
    NameOnly,
    /// Relative to the project root when possible
    #[serde(rename = "Relative Path")]
    RelativePath,
    /// Path as given
    #[serde(rename = "Full Path")]
    FullPath,
}

impl PathMode {
    /// Label used in persisted configuration
    pub fn label(&self) -> &'static str {
        match self {
            PathMode::NameOnly => "Name Only",
            PathMode::RelativePath => "Relative Path",
            PathMode::FullPath => "Full Path",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Name Only" => Some(PathMode::NameOnly),
            "Relative Path" => Some(PathMode::RelativePath),
            "Full Path" => Some(PathMode::FullPath),
            _ => None,
        }
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format `target` for display
///
/// `RelativePath` only applies when `root` is non-empty and a string prefix
/// of `target`; in every other case the target comes back unchanged. The
/// prefix test is textual, so a sibling such as `/proj_a` under root `/proj`
/// is shown as `../proj_a`.
///
/// # Examples
/// ```
/// use prompt_builder::render::path::{format_path, PathMode};
///
/// assert_eq!(format_path("/p/src/a.rs", PathMode::RelativePath, "/p"), "src/a.rs");
/// assert_eq!(format_path("/q/a.rs", PathMode::RelativePath, "/p"), "/q/a.rs");
/// assert_eq!(format_path("/p2/a.rs", PathMode::RelativePath, "/p"), "../p2/a.rs");
/// assert_eq!(format_path("/p/src/a.rs", PathMode::NameOnly, ""), "a.rs");
/// ```
pub fn format_path(target: &str, mode: PathMode, root: &str) -> String {
    if target.is_empty() {
        return String::new();
    }

    match mode {
        PathMode::NameOnly => Path::new(target)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.to_string()),
        PathMode::RelativePath => relative_to(target, root).unwrap_or_else(|| target.to_string()),
        PathMode::FullPath => target.to_string(),
    }
}

/// Format with a persisted mode label; an unknown label shows the full path
pub fn format_path_label(target: &str, mode_label: &str, root: &str) -> String {
    let mode = PathMode::from_label(mode_label).unwrap_or(PathMode::FullPath);
    format_path(target, mode, root)
}

fn relative_to(target: &str, root: &str) -> Option<String> {
    if root.is_empty() || !target.starts_with(root) {
        return None;
    }
    let rel = pathdiff::diff_paths(target, root)?;
    if rel.as_os_str().is_empty() {
        Some(".".to_string())
    } else {
        Some(rel.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_target() {
        for mode in [PathMode::NameOnly, PathMode::RelativePath, PathMode::FullPath] {
            assert_eq!(format_path("", mode, "/root"), "");
        }
    }

    #[test]
    fn test_name_only_ignores_root() {
        assert_eq!(format_path("/a/b/c.txt", PathMode::NameOnly, ""), "c.txt");
        assert_eq!(format_path("/a/b/c.txt", PathMode::NameOnly, "/a"), "c.txt");
        assert_eq!(format_path("c.txt", PathMode::NameOnly, "/elsewhere"), "c.txt");
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(format_path("/proj/src/main.rs", PathMode::RelativePath, "/proj"), "src/main.rs");
        assert_eq!(format_path("/proj/src/main.rs", PathMode::RelativePath, "/proj/"), "src/main.rs");
        assert_eq!(format_path("/proj", PathMode::RelativePath, "/proj"), ".");
    }

    #[test]
    fn test_relative_path_falls_back_to_target() {
        assert_eq!(format_path("/proj/a.rs", PathMode::RelativePath, ""), "/proj/a.rs");
        assert_eq!(format_path("/other/a.rs", PathMode::RelativePath, "/proj"), "/other/a.rs");
        assert_eq!(format_path("/proj", PathMode::RelativePath, "/proj/"), "/proj");
    }

    #[test]
    fn test_relative_path_sibling_with_shared_prefix() {
        assert_eq!(format_path("/proj_a/x.py", PathMode::RelativePath, "/proj"), "../proj_a/x.py");
        assert_eq!(format_path("/project/a.rs", PathMode::RelativePath, "/proj"), "../project/a.rs");
    }

    #[test]
    fn test_full_path() {
        assert_eq!(format_path("/proj/a.rs", PathMode::FullPath, "/proj"), "/proj/a.rs");
    }

    #[test]
    fn test_labels() {
        assert_eq!(PathMode::from_label("Name Only"), Some(PathMode::NameOnly));
        assert_eq!(PathMode::from_label("nope"), None);
        assert_eq!(PathMode::RelativePath.to_string(), "Relative Path");
        assert_eq!(format_path_label("/p/a.rs", "weird", "/p"), "/p/a.rs");
        assert_eq!(
            serde_json::to_string(&PathMode::FullPath).unwrap(),
            "\"Full Path\""
        );
    }
}
