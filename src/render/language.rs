//! Fence language tags for code blocks

use std::path::Path;

/// Tag used when the extension is missing or unknown
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// Fence language for `path`, keyed by its lowercase extension
pub fn language_for_extension(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => "plaintext",
        "md" => "Markdown",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "csv" => "CSV",
        "py" => "Python",
        "js" => "JavaScript",
        "ts" => "TypeScript",
        "java" => "Java",
        "cpp" => "C++",
        "rs" => "Rust",
        "go" => "Go",
        "sh" => "Bash",
        "sql" => "SQL",
        "html" | "htm" => "HTML",
        "css" => "CSS",
        "vue" => "Vue",
        _ => DEFAULT_LANGUAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(language_for_extension("/a/b/script.py"), "Python");
        assert_eq!(language_for_extension("app.JS"), "JavaScript");
        assert_eq!(language_for_extension("page.htm"), "HTML");
        assert_eq!(language_for_extension("conf.yml"), "YAML");
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(language_for_extension("Makefile"), DEFAULT_LANGUAGE);
        assert_eq!(language_for_extension("archive.xyz"), DEFAULT_LANGUAGE);
        assert_eq!(language_for_extension(".bashrc"), DEFAULT_LANGUAGE);
        assert_eq!(language_for_extension(""), DEFAULT_LANGUAGE);
    }
}
