//! Single-document JSON files

use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use super::StoreError;

/// Write `document` to `path` as pretty-printed JSON
pub fn export_document(path: &Path, document: &Value) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(document)?;
    fs::write(path, text).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "document exported");
    Ok(())
}

/// Read a document from `path`; the shape is left for migration to interpret
pub fn import_document(path: &Path) -> Result<Value, StoreError> {
    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let doc = json!({"project_root": "", "items": [{"plugin_id": "core.message"}]});

        export_document(&path, &doc).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\n  "));
        assert_eq!(import_document(&path).unwrap(), doc);
    }

    #[test]
    fn test_import_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(import_document(&path), Err(StoreError::InvalidJson(_))));
    }

    #[test]
    fn test_import_missing_file() {
        assert!(matches!(
            import_document(Path::new("/no/such/doc.json")),
            Err(StoreError::Io { .. })
        ));
    }
}
