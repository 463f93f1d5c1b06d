use pagecraft_model::BlockDefaults;
use serde::{Deserialize, Serialize};

/// Per-client editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorOptions {
    /// Seeds id generation; distinct clients never mint the same id
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Initial values for blocks created from the palette
    #[serde(default)]
    pub block_defaults: BlockDefaults,
}

fn default_client_id() -> String {
    "local".to_string()
}

fn default_undo_levels() -> usize {
    100
}

impl EditorOptions {
    pub fn for_client(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            undo_levels: default_undo_levels(),
            block_defaults: BlockDefaults::default(),
        }
    }
}
