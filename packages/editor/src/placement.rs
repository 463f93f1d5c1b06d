//! # Placement Resolution
//!
//! Turns "what is being dragged" plus "where it was released" into a
//! structured placement. Resolution is a pure function of its inputs and
//! the current tree shape; it never mutates anything.
//!
//! ## Drop tokens
//!
//! The renderer identifies drop surfaces with flat strings:
//!
//! ```text
//! container-drop-zone-{containerId}-{index}   insert into a container
//! grid-cell-{gridId}-{cellIndex}              place into a grid cell
//! workspace-drop-zone-{index}                 insert into the top level
//! workspace-drop-zone                         append to the top level
//! {blockId}                                   insert before a top-level block
//! ```
//!
//! Ids may contain `-`, so the index is always the segment after the last
//! `-` and everything before it is the id. Tokens are decoded once, at the
//! boundary, into [`DropTarget`].

use pagecraft_model::{find_block, Block, BlockTree, BlockType};
use std::fmt;

const CONTAINER_ZONE_PREFIX: &str = "container-drop-zone-";
const GRID_CELL_PREFIX: &str = "grid-cell-";
const WORKSPACE_ZONE: &str = "workspace-drop-zone";

/// A decoded drop token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    ContainerZone { container_id: String, index: usize },
    GridCell { grid_id: String, cell_index: usize },
    /// Between top-level blocks, or (without index) the end of the page
    WorkspaceZone { index: Option<usize> },
    /// Any other surface; usually a block's own id
    Surface(String),
    /// A zone prefix without a usable id/index suffix
    Malformed(String),
}

impl DropTarget {
    pub fn parse(token: &str) -> Self {
        if let Some(rest) = token.strip_prefix(CONTAINER_ZONE_PREFIX) {
            return match split_trailing_index(rest) {
                Some((container_id, index)) => DropTarget::ContainerZone {
                    container_id: container_id.to_string(),
                    index,
                },
                None => DropTarget::Malformed(token.to_string()),
            };
        }

        if let Some(rest) = token.strip_prefix(GRID_CELL_PREFIX) {
            return match split_trailing_index(rest) {
                Some((grid_id, cell_index)) => DropTarget::GridCell {
                    grid_id: grid_id.to_string(),
                    cell_index,
                },
                None => DropTarget::Malformed(token.to_string()),
            };
        }

        if token == WORKSPACE_ZONE {
            return DropTarget::WorkspaceZone { index: None };
        }

        if let Some(rest) = token.strip_prefix(WORKSPACE_ZONE).and_then(|r| r.strip_prefix('-')) {
            return match parse_index(rest) {
                Some(index) => DropTarget::WorkspaceZone { index: Some(index) },
                None => DropTarget::Malformed(token.to_string()),
            };
        }

        DropTarget::Surface(token.to_string())
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropTarget::ContainerZone {
                container_id,
                index,
            } => write!(f, "{}{}-{}", CONTAINER_ZONE_PREFIX, container_id, index),
            DropTarget::GridCell {
                grid_id,
                cell_index,
            } => write!(f, "{}{}-{}", GRID_CELL_PREFIX, grid_id, cell_index),
            DropTarget::WorkspaceZone { index: Some(index) } => {
                write!(f, "{}-{}", WORKSPACE_ZONE, index)
            }
            DropTarget::WorkspaceZone { index: None } => f.write_str(WORKSPACE_ZONE),
            DropTarget::Surface(token) | DropTarget::Malformed(token) => f.write_str(token),
        }
    }
}

/// `"{id}-{n}"` → `(id, n)`; the id must be non-empty
fn split_trailing_index(rest: &str) -> Option<(&str, usize)> {
    let (id, index) = rest.rsplit_once('-')?;
    if id.is_empty() {
        return None;
    }
    Some((id, parse_index(index)?))
}

/// ASCII digits only; `usize::from_str` alone would also take a leading `+`
fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// What is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// A palette entry
    NewBlock(BlockType),
    /// A reusable subtree; inserted as a copy under fresh ids
    Template {
        template_id: String,
        blocks: Vec<Block>,
    },
    /// A block already on the page (top-level reorder)
    ExistingBlock { id: String },
    /// The content of a grid cell
    NestedGridItem { grid_id: String, cell_index: usize },
}

/// Where new content goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Append,
    TopLevel { index: usize },
    Container { container_id: String, index: usize },
    GridCell { grid_id: String, cell_index: usize },
}

/// A fully resolved drop: exactly one editing operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Insert(Placement),
    Reorder {
        from_index: usize,
        to_index: usize,
    },
    MoveGridItem {
        from_grid_id: String,
        from_cell_index: usize,
        to_grid_id: String,
        to_cell_index: usize,
    },
}

/// Resolve a drop. `None` means the drop does nothing.
pub fn resolve(source: &DragSource, token: &str, tree: &BlockTree) -> Option<Resolution> {
    let target = DropTarget::parse(token);

    match source {
        DragSource::NewBlock(_) | DragSource::Template { .. } => {
            resolve_insert(&target, tree).map(Resolution::Insert)
        }
        DragSource::ExistingBlock { id } => resolve_reorder(id, &target, tree),
        DragSource::NestedGridItem {
            grid_id,
            cell_index,
        } => resolve_grid_move(grid_id, *cell_index, &target, tree),
    }
}

fn resolve_insert(target: &DropTarget, tree: &BlockTree) -> Option<Placement> {
    match target {
        DropTarget::ContainerZone {
            container_id,
            index,
        } => {
            find_block(&tree.blocks, container_id).filter(|b| b.is_container())?;
            Some(Placement::Container {
                container_id: container_id.clone(),
                index: *index,
            })
        }
        DropTarget::GridCell {
            grid_id,
            cell_index,
        } => {
            grid_has_cell(tree, grid_id, *cell_index)?;
            Some(Placement::GridCell {
                grid_id: grid_id.clone(),
                cell_index: *cell_index,
            })
        }
        DropTarget::WorkspaceZone { index: Some(index) } => Some(Placement::TopLevel {
            index: (*index).min(tree.blocks.len()),
        }),
        DropTarget::WorkspaceZone { index: None } => Some(Placement::Append),
        DropTarget::Surface(_) if tree.blocks.is_empty() => Some(Placement::Append),
        DropTarget::Surface(id) => tree
            .top_level_index(id)
            .map(|index| Placement::TopLevel { index }),
        DropTarget::Malformed(_) => None,
    }
}

fn resolve_reorder(id: &str, target: &DropTarget, tree: &BlockTree) -> Option<Resolution> {
    let from_index = tree.top_level_index(id)?;
    let last = tree.blocks.len() - 1;

    let to_index = match target {
        DropTarget::Surface(over) => tree.top_level_index(over)?,
        DropTarget::WorkspaceZone { index: Some(index) } => (*index).min(last),
        DropTarget::WorkspaceZone { index: None } => last,
        // Existing blocks are only reordered, never re-parented by a drop
        DropTarget::ContainerZone { .. } | DropTarget::GridCell { .. } | DropTarget::Malformed(_) => {
            return None
        }
    };

    (from_index != to_index).then_some(Resolution::Reorder {
        from_index,
        to_index,
    })
}

fn resolve_grid_move(
    from_grid_id: &str,
    from_cell_index: usize,
    target: &DropTarget,
    tree: &BlockTree,
) -> Option<Resolution> {
    let DropTarget::GridCell {
        grid_id: to_grid_id,
        cell_index: to_cell_index,
    } = target
    else {
        return None;
    };

    if from_grid_id == to_grid_id && from_cell_index == *to_cell_index {
        return None;
    }

    let source = grid_has_cell(tree, from_grid_id, from_cell_index)?;
    source.block.as_ref()?;
    grid_has_cell(tree, to_grid_id, *to_cell_index)?;

    Some(Resolution::MoveGridItem {
        from_grid_id: from_grid_id.to_string(),
        from_cell_index,
        to_grid_id: to_grid_id.clone(),
        to_cell_index: *to_cell_index,
    })
}

fn grid_has_cell<'a>(
    tree: &'a BlockTree,
    grid_id: &str,
    cell_index: usize,
) -> Option<&'a pagecraft_model::GridCell> {
    find_block(&tree.blocks, grid_id)?.cells()?.get(cell_index)
}
