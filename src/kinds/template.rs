//! Template kinds defined by plugin manifests
//!
//! A manifest is a TOML file describing one kind:
//!
//! ```toml
//! id = "user.hello"
//! name = "Hello World"
//! template = "Hello, {who}!\n"
//!
//! [fields]
//! who = "World"
//! ```
//!
//! Each field becomes a configuration key. Compiling substitutes `{field}`
//! placeholders with the configured value, or with the field default when
//! the value is empty.

use regex::{Captures, Regex};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::core::kind::{BlockError, BlockKind, CompileContext, DragType, KindMetadata};
use crate::core::state::{BlockState, ConfigOutcome, ConfigReader};

const PLACEHOLDER_PATTERN: &str = r"\{([A-Za-z_][A-Za-z0-9_]*)\}";

/// Manifest loading errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid manifest: {0}")]
    Invalid(String),
}

/// On-disk shape of a template kind
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateManifest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub drag_types: Vec<DragType>,
    #[serde(default = "default_min_height")]
    pub min_height: u32,
    pub template: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_min_height() -> u32 {
    100
}

pub struct TemplateKind {
    metadata: KindMetadata,
    template: String,
    fields: BTreeMap<String, String>,
    placeholder: Regex,
}

impl TemplateKind {
    pub fn from_manifest(manifest: TemplateManifest) -> Result<Self, ManifestError> {
        if manifest.id.trim().is_empty() {
            return Err(ManifestError::Invalid("`id` must not be empty".into()));
        }
        if manifest.name.trim().is_empty() {
            return Err(ManifestError::Invalid("`name` must not be empty".into()));
        }

        let placeholder = Regex::new(PLACEHOLDER_PATTERN)
            .map_err(|e| ManifestError::Invalid(e.to_string()))?;

        for caps in placeholder.captures_iter(&manifest.template) {
            if !manifest.fields.contains_key(&caps[1]) {
                warn!(kind = %manifest.id, field = &caps[1], "template references an undeclared field");
            }
        }

        Ok(Self {
            metadata: KindMetadata {
                id: manifest.id,
                name: manifest.name,
                description: manifest.description,
                version: manifest.version,
                drag_types: manifest.drag_types,
                min_height: manifest.min_height,
            },
            template: manifest.template,
            fields: manifest.fields,
            placeholder,
        })
    }

    pub fn from_manifest_str(source: &str) -> Result<Self, ManifestError> {
        let manifest: TemplateManifest = toml::from_str(source)?;
        Self::from_manifest(manifest)
    }

    pub fn from_manifest_file(path: &Path) -> Result<Self, ManifestError> {
        let source = fs::read_to_string(path)?;
        Self::from_manifest_str(&source)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn render(&self, state: &BlockState) -> Result<String, BlockError> {
        let mut unknown: Option<String> = None;
        let out = self.placeholder.replace_all(&self.template, |caps: &Captures<'_>| {
            let field = &caps[1];
            match self.fields.get(field) {
                Some(default) => {
                    let value: String = state.get(field).ok().flatten().unwrap_or_default();
                    if value.is_empty() {
                        default.clone()
                    } else {
                        value
                    }
                }
                None => {
                    unknown.get_or_insert_with(|| field.to_string());
                    String::new()
                }
            }
        });

        match unknown {
            Some(field) => Err(BlockError::Template(format!("unknown placeholder `{{{}}}`", field))),
            None => Ok(out.into_owned()),
        }
    }
}

impl BlockKind for TemplateKind {
    fn metadata(&self) -> &KindMetadata {
        &self.metadata
    }

    fn init_config(&self) -> BlockState {
        let map: Map<String, Value> = self
            .fields
            .keys()
            .map(|k| (k.clone(), Value::String(String::new())))
            .collect();
        BlockState::from_value(&Value::Object(map))
    }

    fn set_config(&self, raw: &Value) -> ConfigOutcome {
        let mut reader = ConfigReader::new(raw);
        let map: Map<String, Value> = self
            .fields
            .keys()
            .map(|k| (k.clone(), Value::String(reader.string(k, ""))))
            .collect();
        ConfigOutcome {
            state: BlockState::from_value(&Value::Object(map)),
            warnings: reader.finish(),
        }
    }

    fn compile(&self, state: &BlockState, _ctx: &CompileContext<'_>) -> Result<String, BlockError> {
        self.render(state)
    }
}
