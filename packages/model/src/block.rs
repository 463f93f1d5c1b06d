use crate::error::ModelError;
use crate::grid::{checked_cell_count, GridCell, GridSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Trigger name → ordered function ids. Carried verbatim, never interpreted.
pub type EventBindings = BTreeMap<String, Vec<String>>;

/// The closed set of block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Image,
    Button,
    Video,
    Container,
    Grid,
}

impl BlockType {
    pub const ALL: [BlockType; 6] = [
        BlockType::Text,
        BlockType::Image,
        BlockType::Button,
        BlockType::Video,
        BlockType::Container,
        BlockType::Grid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Image => "image",
            BlockType::Button => "button",
            BlockType::Video => "video",
            BlockType::Container => "container",
            BlockType::Grid => "grid",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ModelError::UnknownBlockType(s.to_string()))
    }
}

/// Attribute bag (color, spacing, sizing). Opaque to the tree logic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockStyle(BTreeMap<String, String>);

impl BlockStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Merge another bag into this one. Empty values remove the key.
    pub fn merge(&mut self, patch: &BlockStyle) {
        for (key, value) in &patch.0 {
            if value.is_empty() {
                self.0.remove(key);
            } else {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Solid,
    Radio,
    Checkbox,
}

/// One node of the page tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,

    #[serde(default)]
    pub style: BlockStyle,

    /// User-assigned DOM anchor, not part of structural identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_id: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub events: EventBindings,

    #[serde(flatten)]
    pub kind: BlockKind,
}

/// Variant-specific payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum BlockKind {
    Text {
        #[serde(default)]
        content: String,
    },
    Image {
        #[serde(default)]
        url: String,
    },
    Button {
        #[serde(default)]
        text: String,
        #[serde(default)]
        link: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        button_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<ButtonVariant>,
    },
    Video {
        #[serde(default)]
        url: String,
    },
    Container {
        #[serde(default)]
        children: Vec<Block>,
    },
    Grid {
        settings: GridSettings,
        #[serde(default)]
        cells: Vec<GridCell>,
    },
}

impl BlockKind {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Text { .. } => BlockType::Text,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::Button { .. } => BlockType::Button,
            BlockKind::Video { .. } => BlockType::Video,
            BlockKind::Container { .. } => BlockType::Container,
            BlockKind::Grid { .. } => BlockType::Grid,
        }
    }
}

/// Initial values for freshly created blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockDefaults {
    pub text_content: String,
    pub button_text: String,
    pub button_link: String,
    pub grid_columns: u32,
    pub grid_rows: u32,
    pub grid_gap_x: u32,
    pub grid_gap_y: u32,
}

impl Default for BlockDefaults {
    fn default() -> Self {
        Self {
            text_content: "New text".to_string(),
            button_text: "Button".to_string(),
            button_link: "#".to_string(),
            grid_columns: 2,
            grid_rows: 1,
            grid_gap_x: 16,
            grid_gap_y: 16,
        }
    }
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            style: BlockStyle::default(),
            html_id: None,
            events: EventBindings::new(),
            kind,
        }
    }

    /// Default-initialized block of the given type
    pub fn with_defaults(id: impl Into<String>, block_type: BlockType, defaults: &BlockDefaults) -> Self {
        let (kind, style) = match block_type {
            BlockType::Text => (
                BlockKind::Text {
                    content: defaults.text_content.clone(),
                },
                BlockStyle::new().with("fontSize", "16px").with("padding", "8px"),
            ),
            BlockType::Image => (
                BlockKind::Image { url: String::new() },
                BlockStyle::new().with("width", "100%"),
            ),
            BlockType::Button => (
                BlockKind::Button {
                    text: defaults.button_text.clone(),
                    link: defaults.button_link.clone(),
                    button_color: None,
                    variant: Some(ButtonVariant::Solid),
                },
                BlockStyle::new().with("padding", "8px 16px"),
            ),
            BlockType::Video => (
                BlockKind::Video { url: String::new() },
                BlockStyle::new().with("width", "100%"),
            ),
            BlockType::Container => (
                BlockKind::Container { children: Vec::new() },
                BlockStyle::new().with("padding", "16px").with("width", "100%"),
            ),
            BlockType::Grid => {
                // Configured shapes past the cell limit fall back to the stock shape
                let (columns, rows) = match checked_cell_count(defaults.grid_columns, defaults.grid_rows) {
                    Some(_) => (defaults.grid_columns, defaults.grid_rows),
                    None => {
                        let stock = BlockDefaults::default();
                        (stock.grid_columns, stock.grid_rows)
                    }
                };
                let settings = GridSettings::new(columns, rows, defaults.grid_gap_x, defaults.grid_gap_y);
                let cells = vec![GridCell::empty(); settings.cell_count()];
                (
                    BlockKind::Grid { settings, cells },
                    BlockStyle::new().with("width", "100%"),
                )
            }
        };

        Self {
            style,
            ..Self::new(id, kind)
        }
    }

    pub fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(
            id,
            BlockKind::Text {
                content: content.into(),
            },
        )
    }

    pub fn container(id: impl Into<String>, children: Vec<Block>) -> Self {
        Self::new(id, BlockKind::Container { children })
    }

    /// Grid whose cells are filled row-major from `blocks`; missing cells stay empty
    pub fn grid(id: impl Into<String>, columns: u32, rows: u32, blocks: Vec<Option<Block>>) -> Self {
        let settings = GridSettings::new(columns, rows, 0, 0);
        let mut cells: Vec<GridCell> = blocks.into_iter().map(GridCell::with_block).collect();
        cells.resize(settings.cell_count(), GridCell::empty());
        Self::new(id, BlockKind::Grid { settings, cells })
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, BlockKind::Container { .. })
    }

    pub fn is_grid(&self) -> bool {
        matches!(self.kind, BlockKind::Grid { .. })
    }

    pub fn children(&self) -> Option<&Vec<Block>> {
        match &self.kind {
            BlockKind::Container { children } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match &mut self.kind {
            BlockKind::Container { children } => Some(children),
            _ => None,
        }
    }

    pub fn cells(&self) -> Option<&Vec<GridCell>> {
        match &self.kind {
            BlockKind::Grid { cells, .. } => Some(cells),
            _ => None,
        }
    }

    pub fn cells_mut(&mut self) -> Option<&mut Vec<GridCell>> {
        match &mut self.kind {
            BlockKind::Grid { cells, .. } => Some(cells),
            _ => None,
        }
    }

    pub fn grid_settings(&self) -> Option<&GridSettings> {
        match &self.kind {
            BlockKind::Grid { settings, .. } => Some(settings),
            _ => None,
        }
    }

    /// Number of blocks in this subtree, including self
    pub fn subtree_size(&self) -> usize {
        1 + match &self.kind {
            BlockKind::Container { children } => children.iter().map(Block::subtree_size).sum(),
            BlockKind::Grid { cells, .. } => cells
                .iter()
                .filter_map(|cell| cell.block.as_ref())
                .map(Block::subtree_size)
                .sum(),
            _ => 0,
        }
    }

    /// Whether `id` names this block or any block it owns
    pub fn contains_id(&self, id: &str) -> bool {
        if self.id == id {
            return true;
        }
        match &self.kind {
            BlockKind::Container { children } => children.iter().any(|c| c.contains_id(id)),
            BlockKind::Grid { cells, .. } => cells
                .iter()
                .filter_map(|cell| cell.block.as_ref())
                .any(|b| b.contains_id(id)),
            _ => false,
        }
    }
}
