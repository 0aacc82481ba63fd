//! Kind Registry - Central registry for the block kinds a document can use
//!
//! This module provides the registry that maps kind ids to their behavior. It
//! supports:
//! - Kind registration (re-registration overwrites) and unregistration
//! - Lookup by id, listing in registration order
//! - Discovery of kinds accepting a given drop payload
//! - Loading template kinds from a plugins directory
//!
//! The registry is an explicit object: build one at start-up and pass it by
//! reference to whatever needs to resolve kinds.

use crate::core::kind::{BlockKind, DragType};
use crate::kinds::template::TemplateKind;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// File extension of template kind manifests
pub const MANIFEST_EXTENSION: &str = "toml";

#[derive(Default)]
struct RegistryInner {
    kinds: HashMap<String, Arc<dyn BlockKind>>,
    order: Vec<String>,
}

/// Registry of available block kinds
///
/// Clones share the same kind table.
#[derive(Clone, Default)]
pub struct KindRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl KindRegistry {
    /// Create a new empty kind registry
    ///
    /// # Example
    /// ```
    /// use prompt_builder::core::registry::KindRegistry;
    ///
    /// let registry = KindRegistry::new();
    /// assert_eq!(registry.count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in kinds (Message, File, Folder Tree)
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::kinds::register_builtin_kinds(&registry);
        registry
    }

    /// Register a kind
    ///
    /// Registering an id that is already present replaces the previous kind
    /// in place, keeping its position in the listing.
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeds
    /// * `Err(RegistryError)` if the kind's metadata is invalid
    pub fn register(&self, kind: Arc<dyn BlockKind>) -> Result<(), RegistryError> {
        Self::validate_kind(&*kind)?;

        let id = kind.id().to_string();
        let name = kind.name().to_string();
        let mut inner = self.inner.write();

        if inner.kinds.insert(id.clone(), kind).is_some() {
            warn!(kind = %id, "overwriting registered kind");
        } else {
            inner.order.push(id.clone());
        }
        debug!(kind = %id, name = %name, "registered kind");
        Ok(())
    }

    /// Unregister a kind
    pub fn unregister(&self, kind_id: &str) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();

        inner
            .kinds
            .remove(kind_id)
            .ok_or_else(|| RegistryError::KindNotFound(kind_id.to_string()))?;
        inner.order.retain(|id| id != kind_id);

        Ok(())
    }

    /// Resolve a kind id
    ///
    /// Absence is not an error here; callers decide what a missing kind means.
    pub fn resolve(&self, kind_id: &str) -> Option<Arc<dyn BlockKind>> {
        self.inner.read().kinds.get(kind_id).cloned()
    }

    /// `(display_name, id)` pairs in registration order
    pub fn list(&self) -> Vec<(String, String)> {
        self.all_kinds()
            .iter()
            .map(|k| (k.name().to_string(), k.id().to_string()))
            .collect()
    }

    /// All kinds in registration order
    pub fn all_kinds(&self) -> Vec<Arc<dyn BlockKind>> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.kinds.get(id).cloned())
            .collect()
    }

    /// The kind new blocks default to: the first one registered
    pub fn default_kind_id(&self) -> Option<String> {
        self.inner.read().order.first().cloned()
    }

    /// Kinds that accept an external drop of the given payload type
    pub fn kinds_accepting(&self, drag: DragType) -> Vec<Arc<dyn BlockKind>> {
        self.all_kinds()
            .into_iter()
            .filter(|k| k.accepts(drag))
            .collect()
    }

    pub fn count(&self) -> usize {
        self.inner.read().kinds.len()
    }

    pub fn contains(&self, kind_id: &str) -> bool {
        self.inner.read().kinds.contains_key(kind_id)
    }

    /// Load template kinds from every manifest in `dir`
    ///
    /// Files whose name starts with `__` are skipped. A manifest that fails
    /// to load is logged and recorded in the report; it never stops the scan.
    /// A directory that does not exist yields an empty report.
    pub fn load_from_dir(&self, dir: &Path) -> PluginLoadReport {
        let mut report = PluginLoadReport::default();

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "plugins directory not present");
                return report;
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot read plugins directory");
                report.failed.push(PluginLoadFailure {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                });
                return report;
            }
        };

        let mut manifests: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_manifest(path))
            .collect();
        manifests.sort();

        for path in manifests {
            let loaded = TemplateKind::from_manifest_file(&path)
                .map_err(|e| e.to_string())
                .and_then(|kind| {
                    let id = kind.id().to_string();
                    self.register(Arc::new(kind))
                        .map(|_| id)
                        .map_err(|e| e.to_string())
                });

            match loaded {
                Ok(id) => {
                    info!(kind = %id, path = %path.display(), "loaded plugin kind");
                    report.loaded.push(id);
                }
                Err(reason) => {
                    warn!(path = %path.display(), error = %reason, "failed to load plugin kind");
                    report.failed.push(PluginLoadFailure { path, reason });
                }
            }
        }

        report
    }

    fn validate_kind(kind: &dyn BlockKind) -> Result<(), RegistryError> {
        let meta = kind.metadata();

        if meta.id.trim().is_empty() {
            return Err(RegistryError::ValidationError(
                "Kind id cannot be empty".into(),
            ));
        }

        if meta.name.trim().is_empty() {
            return Err(RegistryError::ValidationError(format!(
                "Kind `{}` has an empty name",
                meta.id
            )));
        }

        Ok(())
    }
}

fn is_manifest(path: &Path) -> bool {
    let stem_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| !n.starts_with("__"))
        .unwrap_or(false);
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e == MANIFEST_EXTENSION)
        .unwrap_or(false);
    stem_ok && ext_ok && path.is_file()
}

/// Outcome of scanning a plugins directory
#[derive(Debug, Clone, Default)]
pub struct PluginLoadReport {
    /// Ids of kinds registered from the directory
    pub loaded: Vec<String>,
    /// Manifests that could not be loaded
    pub failed: Vec<PluginLoadFailure>,
}

impl PluginLoadReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PluginLoadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Registry error types
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Kind with given ID was not found
    #[error("Kind not found: {0}")]
    KindNotFound(String),

    /// Kind validation failed
    #[error("Validation error: {0}")]
    ValidationError(String),
}
