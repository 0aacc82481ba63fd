//! Block instances and their lifecycle
//!
//! A `BlockInstance` is one entry of a document: a kind id, an enabled flag
//! and the configuration the kind owns. Its phases are
//!
//! ```text
//! Unconfigured -> Configured -> (Active | Inactive)
//!              \-> MissingKind (absorbing until state is re-applied)
//! ```
//!
//! An instance whose kind cannot be resolved keeps its raw payload untouched so
//! a document saved without the plugin installed loses nothing.

use serde_json::{json, Value};
use tracing::warn;

use super::kind::{BlockError, CompileContext};
use super::registry::KindRegistry;
use super::state::BlockState;
use super::BlockId;
use crate::runtime::migrate::{normalize_item, ItemRecord};

/// Default display height of a new block
pub const DEFAULT_BLOCK_HEIGHT: u32 = 80;

/// Persisted heights at or below this are treated as unset
const MIN_RESTORED_HEIGHT: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Unconfigured,
    Configured(BlockState),
    Missing(Value),
}

/// Lifecycle phase of a block instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockPhase {
    Unconfigured,
    Active,
    Inactive,
    MissingKind,
}

/// What a block contributed to a compilation
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutput {
    /// Block is toggled off
    Disabled,
    /// Block has no configuration yet
    Unconfigured,
    /// Text produced by the kind
    Text(String),
    /// Kind is not registered; carries the placeholder marker
    Missing(String),
    /// Kind raised an error; carries the inline marker
    Failed { marker: String, error: BlockError },
}

impl BlockOutput {
    /// The text this output contributes to the prompt
    pub fn into_text(self) -> String {
        match self {
            BlockOutput::Disabled | BlockOutput::Unconfigured => String::new(),
            BlockOutput::Text(text) | BlockOutput::Missing(text) => text,
            BlockOutput::Failed { marker, .. } => marker,
        }
    }
}

/// Marker emitted in place of a block whose kind is not registered
pub fn missing_marker(kind_id: &str) -> String {
    format!("[MISSING: {}]\n", kind_id)
}

/// Marker emitted in place of a block whose kind failed to compile
pub fn error_marker(error: &BlockError) -> String {
    format!("[Error: {}]\n", error)
}

/// One entry in a document
#[derive(Debug, Clone, PartialEq)]
pub struct BlockInstance {
    id: BlockId,
    kind_id: String,
    enabled: bool,
    height: u32,
    payload: Payload,
}

impl BlockInstance {
    /// Create a block of `kind_id` with the kind's initial configuration
    pub fn new(kind_id: &str, registry: &KindRegistry) -> Self {
        let mut block = Self::unconfigured(kind_id);
        match registry.resolve(kind_id) {
            Some(kind) => {
                block.height = block.height.max(kind.metadata().min_height);
                block.payload = Payload::Configured(kind.init_config());
            }
            None => {
                warn!(kind = %kind_id, "creating block for unregistered kind");
                block.payload = Payload::Missing(json!({}));
            }
        }
        block
    }

    /// A block that has a kind but no configuration yet
    pub fn unconfigured(kind_id: &str) -> Self {
        Self {
            id: BlockId::new(),
            kind_id: kind_id.to_string(),
            enabled: true,
            height: DEFAULT_BLOCK_HEIGHT,
            payload: Payload::Unconfigured,
        }
    }

    /// Build a block from a persisted record of either shape
    pub fn from_state(state: &Value, registry: &KindRegistry) -> Self {
        let record = normalize_item(state);
        let mut block = Self::unconfigured(&record.plugin_id);
        block.apply_record(&record, registry);
        block
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn kind_id(&self) -> &str {
        &self.kind_id
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggle whether the block contributes to the output; configuration is untouched
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    pub fn phase(&self) -> BlockPhase {
        match (&self.payload, self.enabled) {
            (Payload::Unconfigured, _) => BlockPhase::Unconfigured,
            (Payload::Missing(_), _) => BlockPhase::MissingKind,
            (Payload::Configured(_), true) => BlockPhase::Active,
            (Payload::Configured(_), false) => BlockPhase::Inactive,
        }
    }

    pub fn is_missing_kind(&self) -> bool {
        matches!(self.payload, Payload::Missing(_))
    }

    /// The kind's canonical configuration, if configured
    pub fn config(&self) -> Option<&BlockState> {
        match &self.payload {
            Payload::Configured(state) => Some(state),
            _ => None,
        }
    }

    /// Re-apply a persisted record (current or legacy shape)
    pub fn set_state(&mut self, state: &Value, registry: &KindRegistry) {
        let record = normalize_item(state);
        self.apply_record(&record, registry);
    }

    pub(crate) fn apply_record(&mut self, record: &ItemRecord, registry: &KindRegistry) {
        self.kind_id = record.plugin_id.clone();
        self.payload = self.configure(&record.data, registry);
        self.enabled = record.is_active;

        if let Some(kind) = registry.resolve(&self.kind_id) {
            self.height = self.height.max(kind.metadata().min_height);
        }
        if record.height > MIN_RESTORED_HEIGHT {
            self.height = record.height;
        }
    }

    fn configure(&self, data: &Value, registry: &KindRegistry) -> Payload {
        match registry.resolve(&self.kind_id) {
            Some(kind) => {
                let outcome = kind.set_config(data);
                for warning in &outcome.warnings {
                    warn!(block = %self.id, kind = %self.kind_id, "{}", warning);
                }
                Payload::Configured(outcome.state)
            }
            None => {
                warn!(block = %self.id, kind = %self.kind_id, "kind not registered; preserving raw data");
                Payload::Missing(data.clone())
            }
        }
    }

    /// The payload persisted under `data`
    pub fn data(&self, registry: &KindRegistry) -> Value {
        match &self.payload {
            Payload::Unconfigured => json!({}),
            Payload::Missing(raw) => raw.clone(),
            Payload::Configured(state) => match registry.resolve(&self.kind_id) {
                Some(kind) => kind.get_config(state),
                None => state.to_value(),
            },
        }
    }

    /// Persisted record for this block
    pub fn to_record(&self, registry: &KindRegistry) -> ItemRecord {
        ItemRecord {
            plugin_id: self.kind_id.clone(),
            is_active: self.enabled,
            height: self.height,
            data: self.data(registry),
        }
    }

    /// Persisted record for this block as JSON
    pub fn get_state(&self, registry: &KindRegistry) -> Value {
        self.to_record(registry).to_value()
    }

    /// Switch to another kind, carrying over whatever configuration it accepts
    pub fn change_kind(&mut self, new_kind_id: &str, registry: &KindRegistry) {
        let transfer = self.data(registry);
        self.kind_id = new_kind_id.to_string();
        self.payload = self.configure(&transfer, registry);
        if let Some(kind) = registry.resolve(new_kind_id) {
            self.height = self.height.max(kind.metadata().min_height);
        }
    }

    /// Compile this block, classifying the result
    ///
    /// Never fails: kind errors become an inline marker.
    pub fn compile(&self, ctx: &CompileContext<'_>, registry: &KindRegistry) -> BlockOutput {
        if !self.enabled {
            return BlockOutput::Disabled;
        }

        let state = match &self.payload {
            Payload::Unconfigured => return BlockOutput::Unconfigured,
            Payload::Missing(_) => return BlockOutput::Missing(missing_marker(&self.kind_id)),
            Payload::Configured(state) => state,
        };

        let kind = match registry.resolve(&self.kind_id) {
            Some(kind) => kind,
            None => return BlockOutput::Missing(missing_marker(&self.kind_id)),
        };

        match kind.compile(state, ctx) {
            Ok(text) => BlockOutput::Text(text),
            Err(error) => {
                warn!(block = %self.id, kind = %self.kind_id, error = %error, "block failed to compile");
                BlockOutput::Failed {
                    marker: error_marker(&error),
                    error,
                }
            }
        }
    }

    /// The text this block contributes to the prompt
    pub fn get_compiled_output(&self, ctx: &CompileContext<'_>, registry: &KindRegistry) -> String {
        self.compile(ctx, registry).into_text()
    }
}
