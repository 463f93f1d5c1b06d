//! # Drag Session
//!
//! Drives one drag gesture from start to drop.
//!
//! ```text
//! Idle ──begin──▶ Dragging(source) ──drop──▶ Idle
//!                        │
//!                        └──cancel──▶ Idle
//! ```
//!
//! Nothing touches the document until `drop`, and `drop` performs at most
//! one editing operation. A cancelled gesture, a drop outside every
//! surface, or a drop that doesn't resolve leaves the document unchanged.

use crate::placement::{resolve, DragSource, Placement, Resolution};
use crate::{Document, MutationResult};
use pagecraft_model::{Block, BlockType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const NEW_BLOCK_PREFIX: &str = "new-block-";
const TEMPLATE_PREFIX: &str = "template-";
const NESTED_BLOCK_PREFIX: &str = "nested-block-";

/// A reusable block subtree offered in the palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub blocks: Vec<Block>,
}

/// Source of templates for `template-*` drags
pub trait TemplateCatalog {
    fn template(&self, id: &str) -> Option<Template>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    templates: HashMap<String, Template>,
}

impl InMemoryCatalog {
    pub fn new(templates: impl IntoIterator<Item = Template>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn insert(&mut self, template: Template) {
        self.templates.insert(template.id.clone(), template);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateCatalog for InMemoryCatalog {
    fn template(&self, id: &str) -> Option<Template> {
        self.templates.get(id).cloned()
    }
}

/// Data the renderer attaches to a draggable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<BlockType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_index: Option<usize>,
}

impl DragSource {
    /// Classify a draggable by its id prefix.
    ///
    /// `new-block-*` needs `payload.block_type`, `template-*` needs a
    /// template the catalog knows (by `payload.template_id`, falling back
    /// to the id suffix), `nested-block-*` needs the grid position. Any
    /// other id is an existing top-level block.
    pub fn classify(active_id: &str, payload: &DragPayload, catalog: &dyn TemplateCatalog) -> Option<Self> {
        if active_id.starts_with(NEW_BLOCK_PREFIX) {
            return payload.block_type.map(DragSource::NewBlock);
        }

        if let Some(suffix) = active_id.strip_prefix(TEMPLATE_PREFIX) {
            let template_id = payload.template_id.as_deref().unwrap_or(suffix);
            let template = catalog.template(template_id)?;
            return Some(DragSource::Template {
                template_id: template.id,
                blocks: template.blocks,
            });
        }

        if active_id.starts_with(NESTED_BLOCK_PREFIX) {
            return Some(DragSource::NestedGridItem {
                grid_id: payload.grid_id.clone()?,
                cell_index: payload.cell_index?,
            });
        }

        Some(DragSource::ExistingBlock {
            id: active_id.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSource),
}

/// One pointer's drag gesture
#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging. Returns false (and stays idle) if the source can't
    /// be classified, e.g. an unknown template.
    pub fn begin(&mut self, active_id: &str, payload: &DragPayload, catalog: &dyn TemplateCatalog) -> bool {
        match DragSource::classify(active_id, payload, catalog) {
            Some(source) => {
                debug!(active_id, ?source, "Drag started");
                self.state = DragState::Dragging(source);
                true
            }
            None => {
                debug!(active_id, "Unrecognized drag source");
                self.state = DragState::Idle;
                false
            }
        }
    }

    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("Drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// Finish the gesture over `target` (`None`: released outside every
    /// drop surface). Returns the applied change, if any.
    pub fn drop(&mut self, target: Option<&str>, doc: &mut Document) -> Option<MutationResult> {
        let DragState::Dragging(source) = std::mem::take(&mut self.state) else {
            return None;
        };

        let Some(token) = target.filter(|t| !t.is_empty()) else {
            debug!("Dropped outside any surface");
            return None;
        };

        let Some(resolution) = resolve(&source, token, doc.tree()) else {
            debug!(token, "Drop did not resolve");
            return None;
        };

        debug!(token, ?resolution, "Drop resolved");
        execute(doc, &source, resolution)
    }
}

/// Run the single operation a resolved drop stands for
fn execute(doc: &mut Document, source: &DragSource, resolution: Resolution) -> Option<MutationResult> {
    match (source, resolution) {
        (DragSource::NewBlock(block_type), Resolution::Insert(placement)) => {
            let block_type = *block_type;
            match placement {
                Placement::Append => doc.add_block(block_type),
                Placement::TopLevel { index } => doc.insert_block(index, block_type),
                Placement::Container {
                    container_id,
                    index,
                } => doc.add_block_to_container(&container_id, index, block_type),
                Placement::GridCell {
                    grid_id,
                    cell_index,
                } => doc.add_block_to_grid_cell(&grid_id, cell_index, block_type),
            }
        }

        (DragSource::Template { blocks, .. }, Resolution::Insert(placement)) => match placement {
            Placement::Append => doc.add_template_blocks(blocks),
            Placement::TopLevel { index } => doc.insert_template_blocks(index, blocks),
            Placement::Container {
                container_id,
                index,
            } => doc.add_template_to_container(&container_id, index, blocks),
            Placement::GridCell {
                grid_id,
                cell_index,
            } => doc.add_template_to_grid_cell(&grid_id, cell_index, blocks),
        },

        (_, Resolution::Reorder {
            from_index,
            to_index,
        }) => doc.move_block(from_index, to_index),

        (
            _,
            Resolution::MoveGridItem {
                from_grid_id,
                from_cell_index,
                to_grid_id,
                to_cell_index,
            },
        ) => {
            if from_grid_id == to_grid_id {
                doc.move_grid_item(&from_grid_id, from_cell_index, to_cell_index)
            } else {
                doc.move_grid_item_across(&from_grid_id, from_cell_index, &to_grid_id, to_cell_index)
            }
        }

        (_, Resolution::Insert(_)) => None,
    }
}
