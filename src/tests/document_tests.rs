//! Document tests: persisted shapes, legacy migration and drop handling

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;

    use crate::core::{Document, DocumentSettings, DropChoice, KindRegistry};
    use crate::kinds::{FILE_KIND_ID, MESSAGE_KIND_ID, TREE_KIND_ID};
    use crate::runtime::compile_document;

    #[test]
    fn test_current_shape_round_trip() {
        let registry = KindRegistry::with_builtins();
        let state = json!({
            "project_root": "/work/app",
            "settings": {"include_tree": true, "global_ignore": ".git, target"},
            "items": [
                {"plugin_id": "core.message", "is_active": true, "height": 100,
                 "data": {"text": "Review this"}},
                {"plugin_id": "core.file", "is_active": false, "height": 140,
                 "data": {"path": "/work/app/src/main.rs", "mode": "Name Only", "text": ""}},
                {"plugin_id": "core.tree", "is_active": true, "height": 180,
                 "data": {"path": "/work/app", "mode": "Full Path", "text": "layout",
                          "ignore": "target", "inject": ["Cargo.toml"]}},
            ]
        });

        let doc = Document::from_state(&state, &registry);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get_state(&registry), state);
    }

    #[test]
    fn test_legacy_items_migrate() {
        let registry = KindRegistry::with_builtins();
        let legacy = json!([
            {"type": "Message", "text": "Hi"},
            {"type": "File", "target_path": "/a.py", "path_mode": "Full Path", "text": "note"},
            {"type": "Folder Tree", "target_path": "/proj", "ignore_patterns": "dist",
             "tree_inject_files": ["x.rs"], "is_active": false},
        ]);

        let doc = Document::from_state(&legacy, &registry);
        assert_eq!(doc.project_root, "");
        assert_eq!(doc.settings, DocumentSettings::default());

        let kinds: Vec<&str> = doc.blocks().iter().map(|b| b.kind_id()).collect();
        assert_eq!(kinds, vec![MESSAGE_KIND_ID, FILE_KIND_ID, TREE_KIND_ID]);

        let state = doc.get_state(&registry);
        assert_eq!(state["items"][0]["data"], json!({"text": "Hi"}));
        assert_eq!(
            state["items"][1]["data"],
            json!({"path": "/a.py", "mode": "Full Path", "text": "note"})
        );
        assert_eq!(
            state["items"][2]["data"],
            json!({"path": "/proj", "mode": "Relative Path", "text": "",
                   "ignore": "dist", "inject": ["x.rs"]})
        );
        assert_eq!(state["items"][2]["is_active"], json!(false));

        // A migrated document saves in the current shape and reloads unchanged
        let reloaded = Document::from_state(&state, &registry);
        assert_eq!(reloaded.get_state(&registry), state);
    }

    #[test]
    fn test_item_without_kind_or_type_is_message() {
        let registry = KindRegistry::with_builtins();
        let doc = Document::from_state(&json!({"items": [{"text": "bare"}]}), &registry);
        assert_eq!(doc.blocks()[0].kind_id(), MESSAGE_KIND_ID);
        assert_eq!(compile_document(&doc, &registry).text, "bare\n");
    }

    #[test]
    fn test_malformed_settings_fall_back() {
        let registry = KindRegistry::with_builtins();
        let doc = Document::from_state(
            &json!({"project_root": 7, "settings": {"include_tree": "yes"}, "items": "nope"}),
            &registry,
        );
        assert_eq!(doc.project_root, "");
        assert_eq!(doc.settings, DocumentSettings::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_new_document_has_one_message() {
        let registry = KindRegistry::with_builtins();
        let doc = Document::new(&registry);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.blocks()[0].kind_id(), MESSAGE_KIND_ID);
        assert_eq!(compile_document(&doc, &registry).text, "");
    }

    #[test]
    fn test_add_move_remove() {
        let registry = KindRegistry::with_builtins();
        let mut doc = Document::empty();
        let a = doc.add_block(MESSAGE_KIND_ID, &registry);
        let b = doc.add_block(FILE_KIND_ID, &registry);
        let c = doc.add_block(TREE_KIND_ID, &registry);

        assert!(doc.move_block(2, 0));
        assert_eq!(doc.position(c), Some(0));
        assert_eq!(doc.position(a), Some(1));
        assert!(!doc.move_block(5, 0));

        assert!(doc.remove_block(b));
        assert!(!doc.remove_block(b));
        assert_eq!(doc.len(), 2);

        doc.clear();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_drop_choice_and_dropped_paths() {
        let registry = KindRegistry::with_builtins();
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.rs");
        fs::write(&file, "fn a() {}").unwrap();

        assert_eq!(
            Document::choose_drop_kind(&[file.clone()], &registry),
            DropChoice::Auto(FILE_KIND_ID.to_string())
        );
        assert_eq!(
            Document::choose_drop_kind(&[dir.path().to_path_buf()], &registry),
            DropChoice::Auto(TREE_KIND_ID.to_string())
        );

        let mut doc = Document::empty();
        let paths: Vec<PathBuf> = vec![file.clone(), file.clone()];
        assert_eq!(doc.add_dropped_paths(&paths, FILE_KIND_ID, &registry), 2);

        let text = compile_document(&doc, &registry).text;
        assert_eq!(text.matches("fn a() {}").count(), 2);
    }
}
