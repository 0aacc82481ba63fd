//! Persisted record shapes and load-time normalization
//!
//! Saved documents come in two shapes. The current one stores each block as
//! `{plugin_id, is_active, height, data}`; the legacy one has no `plugin_id`
//! and keeps the block's fields flat next to a `type` label. Everything read
//! from disk or the database goes through `normalize_document` /
//! `normalize_item` exactly once, so the rest of the crate only ever sees the
//! current shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::core::document::DocumentSettings;
use crate::core::state::type_name;
use crate::kinds::{FILE_KIND_ID, MESSAGE_KIND_ID, TREE_KIND_ID};

/// One block as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub plugin_id: String,
    pub is_active: bool,
    /// Display height; 0 when the record did not carry one
    pub height: u32,
    pub data: Value,
}

/// A whole document as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub project_root: String,
    pub settings: DocumentSettings,
    pub items: Vec<ItemRecord>,
}

impl DocumentRecord {
    pub fn to_value(&self) -> Value {
        json!({
            "project_root": self.project_root,
            "settings": {
                "include_tree": self.settings.include_tree,
                "global_ignore": self.settings.global_ignore,
            },
            "items": self.items.iter().map(ItemRecord::to_value).collect::<Vec<_>>(),
        })
    }
}

impl ItemRecord {
    pub fn to_value(&self) -> Value {
        json!({
            "plugin_id": self.plugin_id,
            "is_active": self.is_active,
            "height": self.height,
            "data": self.data,
        })
    }
}

/// True when an item lacks `plugin_id` and carries the flat legacy fields
pub fn is_legacy_item(raw: &Value) -> bool {
    raw.as_object()
        .map(|obj| !has_plugin_id(obj) && obj.contains_key("type"))
        .unwrap_or(false)
}

fn has_plugin_id(obj: &Map<String, Value>) -> bool {
    obj.get("plugin_id")
        .and_then(Value::as_str)
        .map(|s| !s.is_empty())
        .unwrap_or(false)
}

/// Normalize a persisted document of either shape
///
/// A top-level array is the oldest format: a bare item list with no root and
/// no settings.
pub fn normalize_document(raw: &Value) -> DocumentRecord {
    let mut record = DocumentRecord {
        project_root: String::new(),
        settings: DocumentSettings::default(),
        items: Vec::new(),
    };

    match raw {
        Value::Array(items) => {
            record.items = items.iter().map(normalize_item).collect();
        }
        Value::Object(obj) => {
            match obj.get("project_root") {
                Some(Value::String(root)) => record.project_root = root.clone(),
                Some(Value::Null) | None => {}
                Some(other) => warn!(found = type_name(other), "project_root is not a string; using empty root"),
            }

            match obj.get("settings") {
                Some(Value::Object(settings)) => apply_settings(&mut record.settings, settings),
                Some(Value::Null) | None => {}
                Some(other) => warn!(found = type_name(other), "settings is not an object; using defaults"),
            }

            match obj.get("items") {
                Some(Value::Array(items)) => {
                    record.items = items.iter().map(normalize_item).collect();
                }
                Some(Value::Null) | None => {}
                Some(other) => warn!(found = type_name(other), "items is not a list; document loads empty"),
            }
        }
        other => warn!(found = type_name(other), "saved document is neither an object nor a list"),
    }

    record
}

fn apply_settings(settings: &mut DocumentSettings, raw: &Map<String, Value>) {
    match raw.get("include_tree") {
        Some(Value::Bool(b)) => settings.include_tree = *b,
        Some(Value::Null) | None => {}
        Some(other) => warn!(found = type_name(other), "include_tree is not a boolean; keeping default"),
    }
    match raw.get("global_ignore") {
        Some(Value::String(s)) => settings.global_ignore = s.clone(),
        Some(Value::Null) | None => {}
        Some(other) => warn!(found = type_name(other), "global_ignore is not a string; keeping default"),
    }
}

/// Normalize a single persisted block of either shape
pub fn normalize_item(raw: &Value) -> ItemRecord {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            warn!(found = type_name(raw), "block record is not an object; loading an empty message");
            return ItemRecord {
                plugin_id: MESSAGE_KIND_ID.to_string(),
                is_active: true,
                height: 0,
                data: json!({}),
            };
        }
    };

    let (plugin_id, data) = if has_plugin_id(obj) {
        let id = obj.get("plugin_id").and_then(Value::as_str).unwrap_or_default();
        (id.to_string(), explicit_data(obj, raw))
    } else if obj.contains_key("type") {
        let legacy_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();
        legacy_payload(legacy_type, obj)
    } else {
        (MESSAGE_KIND_ID.to_string(), explicit_data(obj, raw))
    };

    let is_active = match obj.get("is_active") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Null) | None => true,
        Some(other) => {
            warn!(found = type_name(other), "is_active is not a boolean; block stays active");
            true
        }
    };

    let height = obj
        .get("height")
        .and_then(Value::as_u64)
        .and_then(|h| u32::try_from(h).ok())
        .unwrap_or(0);

    ItemRecord {
        plugin_id,
        is_active,
        height,
        data,
    }
}

fn explicit_data(obj: &Map<String, Value>, raw: &Value) -> Value {
    match obj.get("data") {
        Some(Value::Null) | None => raw.clone(),
        Some(data) => data.clone(),
    }
}

fn field(obj: &Map<String, Value>, key: &str, default: Value) -> Value {
    match obj.get(key) {
        Some(Value::Null) | None => default,
        Some(v) => v.clone(),
    }
}

fn legacy_payload(legacy_type: &str, obj: &Map<String, Value>) -> (String, Value) {
    match legacy_type {
        "File" => (
            FILE_KIND_ID.to_string(),
            json!({
                "path": field(obj, "target_path", json!("")),
                "mode": field(obj, "path_mode", json!("Relative Path")),
                "text": field(obj, "text", json!("")),
            }),
        ),
        "Folder Tree" => (
            TREE_KIND_ID.to_string(),
            json!({
                "path": field(obj, "target_path", json!("")),
                "mode": field(obj, "path_mode", json!("Relative Path")),
                "text": field(obj, "text", json!("")),
                "ignore": field(obj, "ignore_patterns", json!("")),
                "inject": field(obj, "tree_inject_files", json!([])),
            }),
        ),
        _ => (
            MESSAGE_KIND_ID.to_string(),
            json!({ "text": field(obj, "text", json!("")) }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_item_passes_through() {
        let raw = json!({
            "plugin_id": "core.file",
            "is_active": false,
            "height": 140,
            "data": {"path": "/a.py", "mode": "Full Path", "text": "n"}
        });
        let item = normalize_item(&raw);
        assert_eq!(item.plugin_id, "core.file");
        assert!(!item.is_active);
        assert_eq!(item.height, 140);
        assert_eq!(item.data["mode"], "Full Path");
        assert!(!is_legacy_item(&raw));
    }

    #[test]
    fn test_legacy_file_item() {
        let raw = json!({
            "type": "File",
            "text": "note",
            "target_path": "/src/main.py",
            "path_mode": "Name Only",
            "is_active": true
        });
        assert!(is_legacy_item(&raw));
        let item = normalize_item(&raw);
        assert_eq!(item.plugin_id, FILE_KIND_ID);
        assert_eq!(
            item.data,
            json!({"path": "/src/main.py", "mode": "Name Only", "text": "note"})
        );
    }

    #[test]
    fn test_legacy_tree_item() {
        let raw = json!({
            "type": "Folder Tree",
            "target_path": "/proj",
            "ignore_patterns": "target",
            "tree_inject_files": ["src/lib.rs"]
        });
        let item = normalize_item(&raw);
        assert_eq!(item.plugin_id, TREE_KIND_ID);
        assert_eq!(item.data["path"], "/proj");
        assert_eq!(item.data["mode"], "Relative Path");
        assert_eq!(item.data["ignore"], "target");
        assert_eq!(item.data["inject"], json!(["src/lib.rs"]));
    }

    #[test]
    fn test_legacy_unknown_type_becomes_message() {
        let item = normalize_item(&json!({"type": "Message", "text": "hi"}));
        assert_eq!(item.plugin_id, MESSAGE_KIND_ID);
        assert_eq!(item.data, json!({"text": "hi"}));

        let item = normalize_item(&json!({"type": 12, "text": "odd"}));
        assert_eq!(item.plugin_id, MESSAGE_KIND_ID);
        assert_eq!(item.data, json!({"text": "odd"}));
    }

    #[test]
    fn test_item_without_id_or_type_is_message_over_itself() {
        let raw = json!({"text": "bare"});
        let item = normalize_item(&raw);
        assert_eq!(item.plugin_id, MESSAGE_KIND_ID);
        assert_eq!(item.data, raw);
        assert!(item.is_active);
        assert_eq!(item.height, 0);
    }

    #[test]
    fn test_bad_types_take_defaults() {
        let item = normalize_item(&json!({"plugin_id": "core.message", "is_active": "yes", "height": -5}));
        assert!(item.is_active);
        assert_eq!(item.height, 0);

        let item = normalize_item(&json!(7));
        assert_eq!(item.plugin_id, MESSAGE_KIND_ID);
    }

    #[test]
    fn test_document_legacy_list() {
        let raw = json!([{"type": "Message", "text": "a"}, {"type": "File", "target_path": "/x"}]);
        let doc = normalize_document(&raw);
        assert_eq!(doc.project_root, "");
        assert_eq!(doc.settings, DocumentSettings::default());
        assert_eq!(doc.items.len(), 2);
        assert_eq!(doc.items[1].plugin_id, FILE_KIND_ID);
    }

    #[test]
    fn test_document_partial_settings() {
        let raw = json!({
            "project_root": "/proj",
            "settings": {"include_tree": true, "global_ignore": 3},
            "items": []
        });
        let doc = normalize_document(&raw);
        assert_eq!(doc.project_root, "/proj");
        assert!(doc.settings.include_tree);
        assert_eq!(doc.settings.global_ignore, DocumentSettings::default().global_ignore);
    }

    #[test]
    fn test_document_garbage() {
        let doc = normalize_document(&json!("nonsense"));
        assert!(doc.items.is_empty());
        let doc = normalize_document(&json!({"items": {"not": "a list"}, "project_root": 5}));
        assert!(doc.items.is_empty());
        assert_eq!(doc.project_root, "");
    }

    #[test]
    fn test_record_to_value_shape() {
        let record = DocumentRecord {
            project_root: "/p".into(),
            settings: DocumentSettings::default(),
            items: vec![ItemRecord {
                plugin_id: "core.message".into(),
                is_active: true,
                height: 80,
                data: json!({"text": "x"}),
            }],
        };
        let value = record.to_value();
        assert_eq!(value["settings"]["include_tree"], false);
        assert_eq!(value["items"][0]["plugin_id"], "core.message");
        assert_eq!(normalize_document(&value), record);
    }
}
