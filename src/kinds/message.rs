//! Message block: free text copied into the prompt

use serde_json::{json, Value};

use crate::core::kind::{BlockError, BlockKind, CompileContext, KindMetadata};
use crate::core::state::{BlockState, ConfigOutcome, ConfigReader};

use super::MESSAGE_KIND_ID;

pub struct MessageKind {
    metadata: KindMetadata,
}

impl MessageKind {
    pub fn new() -> Self {
        Self {
            metadata: Self::build_metadata(),
        }
    }

    fn build_metadata() -> KindMetadata {
        KindMetadata {
            id: MESSAGE_KIND_ID.into(),
            name: "Message".into(),
            description: "Free-form instructions copied verbatim".into(),
            version: "1.0.0".into(),
            drag_types: Vec::new(),
            min_height: 100,
        }
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockKind for MessageKind {
    fn metadata(&self) -> &KindMetadata {
        &self.metadata
    }

    fn init_config(&self) -> BlockState {
        BlockState::from_value(&json!({ "text": "" }))
    }

    fn set_config(&self, raw: &Value) -> ConfigOutcome {
        let mut reader = ConfigReader::new(raw);
        let text = reader.string("text", "");
        ConfigOutcome {
            state: BlockState::from_value(&json!({ "text": text })),
            warnings: reader.finish(),
        }
    }

    fn compile(&self, state: &BlockState, _ctx: &CompileContext<'_>) -> Result<String, BlockError> {
        let text: String = state.get("text").ok().flatten().unwrap_or_default();
        Ok(format!("{}\n", text))
    }
}
