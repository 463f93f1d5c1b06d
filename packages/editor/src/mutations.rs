//! # Tree Mutations
//!
//! The only sanctioned way to change a page. Every mutation is a plain,
//! serializable value that carries everything it needs: blocks created by
//! the editor are materialized (fresh ids included) before the mutation is
//! built, so replaying the same value on another client yields the same
//! tree.
//!
//! ## Semantics
//!
//! ### Insert
//! - Container and top-level indices are clamped to the sequence length
//! - Grid cell indices must be in range; placing into a cell replaces its content
//! - Payload ids must be unique and unused by the tree
//!
//! ### Move
//! - `MoveBlock` is a top-level reorder: remove at `from_index`, insert at `to_index`
//! - Grid moves swap the content of the two cells; alignment stays with the cell
//! - A move into a grid that lives inside the moved block fails (no cycles)
//!
//! ### Delete
//! - Removes the block and everything it owns
//! - A block deleted from a grid leaves its cell behind, empty
//!
//! `apply` is strict and reports why a mutation did not apply. Callers
//! working on a shared tree apply to a copy and discard it on error, so a
//! failed mutation is never observable.

use pagecraft_model::{
    checked_cell_count, find_block, find_block_mut, remove_block, validate_blocks, Block,
    BlockKind, BlockPatch, BlockTree, CellAlign, FooterPatch, GridCell, GridSettingsPatch,
    HeaderPatch, ModelError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Splice blocks into the top level at `index`, or append
    InsertBlocks {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
        blocks: Vec<Block>,
    },

    /// Splice blocks into a container's children at `index`
    InsertIntoContainer {
        container_id: String,
        index: usize,
        blocks: Vec<Block>,
    },

    /// Place a block into a grid cell, replacing whatever was there
    SetGridCellBlock {
        grid_id: String,
        cell_index: usize,
        block: Block,
    },

    /// Reorder the top-level sequence
    MoveBlock { from_index: usize, to_index: usize },

    /// Swap the content of two cells of one grid
    MoveGridItem {
        grid_id: String,
        from_cell_index: usize,
        to_cell_index: usize,
    },

    /// Swap the content of cells belonging to two different grids
    MoveGridItemAcross {
        from_grid_id: String,
        from_cell_index: usize,
        to_grid_id: String,
        to_cell_index: usize,
    },

    UpdateBlock { id: String, patch: BlockPatch },

    UpdateGridSettings {
        grid_id: String,
        patch: GridSettingsPatch,
    },

    /// Set (or clear, with `None`) a cell's alignment override
    UpdateGridCellAlign {
        grid_id: String,
        cell_index: usize,
        #[serde(default)]
        align: Option<CellAlign>,
        #[serde(default)]
        justify: Option<CellAlign>,
    },

    /// Remove a block and its whole subtree
    DeleteBlock { id: String },

    UpdateHeader { patch: HeaderPatch },

    UpdateFooter { patch: FooterPatch },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Grid not found: {0}")]
    GridNotFound(String),

    #[error("Cell {cell_index} is out of range for grid {grid_id} ({len} cells)")]
    CellOutOfRange {
        grid_id: String,
        cell_index: usize,
        len: usize,
    },

    #[error("Index {index} is out of range ({len} blocks)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cell {cell_index} of grid {grid_id} is empty")]
    EmptyCell { grid_id: String, cell_index: usize },

    #[error("Mutation carries no blocks")]
    EmptyPayload,

    #[error("Source and destination are the same")]
    NoChange,

    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] ModelError),
}

impl Mutation {
    /// Short name used in logs and history descriptions
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::InsertBlocks { .. } => "insertBlocks",
            Mutation::InsertIntoContainer { .. } => "insertIntoContainer",
            Mutation::SetGridCellBlock { .. } => "setGridCellBlock",
            Mutation::MoveBlock { .. } => "moveBlock",
            Mutation::MoveGridItem { .. } => "moveGridItem",
            Mutation::MoveGridItemAcross { .. } => "moveGridItemAcross",
            Mutation::UpdateBlock { .. } => "updateBlock",
            Mutation::UpdateGridSettings { .. } => "updateGridSettings",
            Mutation::UpdateGridCellAlign { .. } => "updateGridCellAlign",
            Mutation::DeleteBlock { .. } => "deleteBlock",
            Mutation::UpdateHeader { .. } => "updateHeader",
            Mutation::UpdateFooter { .. } => "updateFooter",
        }
    }

    /// Blocks this mutation adds to the tree, descendants not listed
    pub fn inserted_blocks(&self) -> &[Block] {
        match self {
            Mutation::InsertBlocks { blocks, .. } | Mutation::InsertIntoContainer { blocks, .. } => {
                blocks
            }
            Mutation::SetGridCellBlock { block, .. } => std::slice::from_ref(block),
            _ => &[],
        }
    }

    /// Apply mutation to the tree with validation.
    ///
    /// On error the tree may be partially modified; apply to a copy.
    pub fn apply(&self, tree: &mut BlockTree) -> Result<(), MutationError> {
        // Validate first
        self.validate(tree)?;

        match self {
            Mutation::InsertBlocks { index, blocks } => {
                let at = index.unwrap_or(tree.blocks.len()).min(tree.blocks.len());
                tree.blocks.splice(at..at, blocks.iter().cloned());
                Ok(())
            }

            Mutation::InsertIntoContainer {
                container_id,
                index,
                blocks,
            } => {
                let children = container_children(&mut tree.blocks, container_id)?;
                let at = (*index).min(children.len());
                children.splice(at..at, blocks.iter().cloned());
                Ok(())
            }

            Mutation::SetGridCellBlock {
                grid_id,
                cell_index,
                block,
            } => {
                let cells = grid_cells(&mut tree.blocks, grid_id)?;
                cell_at(cells, grid_id, *cell_index)?.block = Some(block.clone());
                Ok(())
            }

            Mutation::MoveBlock {
                from_index,
                to_index,
            } => Self::apply_move_block(tree, *from_index, *to_index),

            Mutation::MoveGridItem {
                grid_id,
                from_cell_index,
                to_cell_index,
            } => Self::apply_move_grid_item(tree, grid_id, *from_cell_index, *to_cell_index),

            Mutation::MoveGridItemAcross {
                from_grid_id,
                from_cell_index,
                to_grid_id,
                to_cell_index,
            } => Self::apply_move_across(
                tree,
                from_grid_id,
                *from_cell_index,
                to_grid_id,
                *to_cell_index,
            ),

            Mutation::UpdateBlock { id, patch } => {
                let block = find_block_mut(&mut tree.blocks, id)
                    .ok_or_else(|| MutationError::BlockNotFound(id.clone()))?;
                patch.apply_to(block);
                Ok(())
            }

            Mutation::UpdateGridSettings { grid_id, patch } => {
                let block = find_block_mut(&mut tree.blocks, grid_id)
                    .ok_or_else(|| MutationError::GridNotFound(grid_id.clone()))?;
                match &mut block.kind {
                    BlockKind::Grid { settings, cells } => {
                        patch.apply_to(settings, cells)?;
                        Ok(())
                    }
                    _ => Err(MutationError::GridNotFound(grid_id.clone())),
                }
            }

            Mutation::UpdateGridCellAlign {
                grid_id,
                cell_index,
                align,
                justify,
            } => {
                let cells = grid_cells(&mut tree.blocks, grid_id)?;
                let cell = cell_at(cells, grid_id, *cell_index)?;
                cell.align = *align;
                cell.justify = *justify;
                Ok(())
            }

            Mutation::DeleteBlock { id } => {
                remove_block(&mut tree.blocks, id)
                    .map(|_| ())
                    .ok_or_else(|| MutationError::BlockNotFound(id.clone()))
            }

            Mutation::UpdateHeader { patch } => {
                patch.apply_to(&mut tree.header);
                Ok(())
            }

            Mutation::UpdateFooter { patch } => {
                patch.apply_to(&mut tree.footer);
                Ok(())
            }
        }
    }

    fn apply_move_block(tree: &mut BlockTree, from: usize, to: usize) -> Result<(), MutationError> {
        let len = tree.blocks.len();
        for index in [from, to] {
            if index >= len {
                return Err(MutationError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Err(MutationError::NoChange);
        }

        let block = tree.blocks.remove(from);
        tree.blocks.insert(to, block);
        Ok(())
    }

    fn apply_move_grid_item(
        tree: &mut BlockTree,
        grid_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), MutationError> {
        let cells = grid_cells(&mut tree.blocks, grid_id)?;
        cell_at(cells, grid_id, to)?;
        let moved = take_cell_block(cell_at(cells, grid_id, from)?, grid_id, from)?;

        let displaced = std::mem::replace(&mut cells[to].block, Some(moved));
        cells[from].block = displaced;
        Ok(())
    }

    fn apply_move_across(
        tree: &mut BlockTree,
        from_grid_id: &str,
        from: usize,
        to_grid_id: &str,
        to: usize,
    ) -> Result<(), MutationError> {
        if from_grid_id == to_grid_id {
            return Self::apply_move_grid_item(tree, from_grid_id, from, to);
        }

        let source = grid_cells(&mut tree.blocks, from_grid_id)?;
        let moved = take_cell_block(cell_at(source, from_grid_id, from)?, from_grid_id, from)?;

        // The target grid is unreachable here if it lives inside `moved`
        let target = grid_cells(&mut tree.blocks, to_grid_id)?;
        let displaced = std::mem::replace(&mut cell_at(target, to_grid_id, to)?.block, Some(moved));

        // Likewise the source grid if it lived inside `displaced`
        let source = grid_cells(&mut tree.blocks, from_grid_id)?;
        source[from].block = displaced;
        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, tree: &BlockTree) -> Result<(), MutationError> {
        match self {
            Mutation::InsertBlocks { blocks, .. } => validate_payload(tree, blocks),

            Mutation::InsertIntoContainer {
                container_id,
                blocks,
                ..
            } => {
                match find_block(&tree.blocks, container_id) {
                    Some(block) if block.is_container() => {}
                    _ => return Err(MutationError::ContainerNotFound(container_id.clone())),
                }
                validate_payload(tree, blocks)
            }

            Mutation::SetGridCellBlock {
                grid_id,
                cell_index,
                block,
            } => {
                check_cell(tree, grid_id, *cell_index)?;
                validate_payload(tree, std::slice::from_ref(block))
            }

            Mutation::MoveGridItem {
                grid_id,
                from_cell_index,
                to_cell_index,
            } => {
                check_cell(tree, grid_id, *from_cell_index)?;
                check_cell(tree, grid_id, *to_cell_index)?;
                if from_cell_index == to_cell_index {
                    return Err(MutationError::NoChange);
                }
                Ok(())
            }

            Mutation::MoveGridItemAcross {
                from_grid_id,
                from_cell_index,
                to_grid_id,
                to_cell_index,
            } => {
                check_cell(tree, from_grid_id, *from_cell_index)?;
                check_cell(tree, to_grid_id, *to_cell_index)?;
                if from_grid_id == to_grid_id && from_cell_index == to_cell_index {
                    return Err(MutationError::NoChange);
                }
                Ok(())
            }

            Mutation::UpdateGridCellAlign {
                grid_id,
                cell_index,
                ..
            } => check_cell(tree, grid_id, *cell_index),

            Mutation::UpdateBlock { id, .. } | Mutation::DeleteBlock { id } => {
                find_block(&tree.blocks, id)
                    .ok_or_else(|| MutationError::BlockNotFound(id.clone()))?;
                Ok(())
            }

            Mutation::UpdateGridSettings { grid_id, patch } => {
                let settings = find_block(&tree.blocks, grid_id)
                    .and_then(Block::grid_settings)
                    .ok_or_else(|| MutationError::GridNotFound(grid_id.clone()))?;
                let columns = patch.columns.unwrap_or(settings.columns);
                let rows = patch.rows.unwrap_or(settings.rows);
                if checked_cell_count(columns, rows).is_none() {
                    return Err(ModelError::GridTooLarge { columns, rows }.into());
                }
                Ok(())
            }

            Mutation::MoveBlock { .. } | Mutation::UpdateHeader { .. } | Mutation::UpdateFooter { .. } => {
                Ok(())
            }
        }
    }
}

fn validate_payload(tree: &BlockTree, blocks: &[Block]) -> Result<(), MutationError> {
    if blocks.is_empty() {
        return Err(MutationError::EmptyPayload);
    }
    let taken: HashSet<String> = tree.ids().into_iter().collect();
    validate_blocks(blocks, &taken)?;
    Ok(())
}

fn check_cell(tree: &BlockTree, grid_id: &str, cell_index: usize) -> Result<(), MutationError> {
    let cells = find_block(&tree.blocks, grid_id)
        .and_then(Block::cells)
        .ok_or_else(|| MutationError::GridNotFound(grid_id.to_string()))?;
    if cell_index >= cells.len() {
        return Err(MutationError::CellOutOfRange {
            grid_id: grid_id.to_string(),
            cell_index,
            len: cells.len(),
        });
    }
    Ok(())
}

fn container_children<'a>(blocks: &'a mut [Block], id: &str) -> Result<&'a mut Vec<Block>, MutationError> {
    find_block_mut(blocks, id)
        .and_then(|block| block.children_mut())
        .ok_or_else(|| MutationError::ContainerNotFound(id.to_string()))
}

fn grid_cells<'a>(blocks: &'a mut [Block], id: &str) -> Result<&'a mut Vec<GridCell>, MutationError> {
    find_block_mut(blocks, id)
        .and_then(|block| block.cells_mut())
        .ok_or_else(|| MutationError::GridNotFound(id.to_string()))
}

fn cell_at<'a>(
    cells: &'a mut [GridCell],
    grid_id: &str,
    cell_index: usize,
) -> Result<&'a mut GridCell, MutationError> {
    let len = cells.len();
    cells
        .get_mut(cell_index)
        .ok_or_else(|| MutationError::CellOutOfRange {
            grid_id: grid_id.to_string(),
            cell_index,
            len,
        })
}

fn take_cell_block(cell: &mut GridCell, grid_id: &str, cell_index: usize) -> Result<Block, MutationError> {
    cell.block.take().ok_or_else(|| MutationError::EmptyCell {
        grid_id: grid_id.to_string(),
        cell_index,
    })
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    /// The mutation exactly as applied, ready to ship to peers
    pub mutation: Mutation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> BlockTree {
        BlockTree::from_blocks(vec![
            Block::text("a", "A"),
            Block::container("c", vec![Block::text("c-1", "")]),
            Block::grid(
                "g",
                2,
                1,
                vec![Some(Block::text("cell-0", "")), None],
            ),
        ])
    }

    #[test]
    fn test_insert_index_is_clamped() {
        let mut tree = tree();
        Mutation::InsertIntoContainer {
            container_id: "c".to_string(),
            index: 99,
            blocks: vec![Block::text("new", "")],
        }
        .apply(&mut tree)
        .unwrap();

        let children = find_block(&tree.blocks, "c").unwrap().children().unwrap();
        assert_eq!(children.last().unwrap().id, "new");
    }

    #[test]
    fn test_insert_rejects_duplicate_ids() {
        let mut tree = tree();
        let result = Mutation::InsertBlocks {
            index: None,
            blocks: vec![Block::text("c-1", "")],
        }
        .apply(&mut tree);

        assert_eq!(
            result,
            Err(MutationError::InvalidPayload(ModelError::DuplicateId(
                "c-1".to_string()
            )))
        );
    }

    #[test]
    fn test_grid_move_swaps_cell_content() {
        let mut tree = tree();
        Mutation::MoveGridItem {
            grid_id: "g".to_string(),
            from_cell_index: 0,
            to_cell_index: 1,
        }
        .apply(&mut tree)
        .unwrap();

        let cells = find_block(&tree.blocks, "g").unwrap().cells().unwrap();
        assert!(cells[0].is_empty());
        assert_eq!(cells[1].block.as_ref().unwrap().id, "cell-0");
    }

    #[test]
    fn test_grid_move_from_empty_cell_fails() {
        let mut tree = tree();
        let result = Mutation::MoveGridItem {
            grid_id: "g".to_string(),
            from_cell_index: 1,
            to_cell_index: 0,
        }
        .apply(&mut tree);

        assert_eq!(
            result,
            Err(MutationError::EmptyCell {
                grid_id: "g".to_string(),
                cell_index: 1
            })
        );
    }

    #[test]
    fn test_move_into_own_descendant_grid_fails() {
        let inner = Block::grid("inner", 1, 1, vec![]);
        let mut tree = BlockTree::from_blocks(vec![Block::grid(
            "outer",
            2,
            1,
            vec![Some(Block::container("box", vec![inner]))],
        )]);

        let result = Mutation::MoveGridItemAcross {
            from_grid_id: "outer".to_string(),
            from_cell_index: 0,
            to_grid_id: "inner".to_string(),
            to_cell_index: 0,
        }
        .apply(&mut tree);

        assert_eq!(result, Err(MutationError::GridNotFound("inner".to_string())));
    }

    #[test]
    fn test_update_settings_on_non_grid_fails() {
        let mut tree = tree();
        let result = Mutation::UpdateGridSettings {
            grid_id: "c".to_string(),
            patch: GridSettingsPatch::shape(3, 1),
        }
        .apply(&mut tree);

        assert_eq!(result, Err(MutationError::GridNotFound("c".to_string())));
    }

    #[test]
    fn test_oversized_grid_shape_is_rejected() {
        let mut tree = tree();
        let before = tree.clone();
        let mutation = Mutation::UpdateGridSettings {
            grid_id: "g".to_string(),
            patch: GridSettingsPatch::shape(u32::MAX, u32::MAX),
        };

        let expected = Err(MutationError::InvalidPayload(ModelError::GridTooLarge {
            columns: u32::MAX,
            rows: u32::MAX,
        }));
        assert_eq!(mutation.validate(&tree), expected);
        assert_eq!(mutation.apply(&mut tree), expected);
        assert_eq!(tree, before);

        // Only the rows change; the kept column count still counts
        let rows_only = Mutation::UpdateGridSettings {
            grid_id: "g".to_string(),
            patch: GridSettingsPatch {
                rows: Some(u32::MAX),
                ..GridSettingsPatch::default()
            },
        };
        assert!(rows_only.validate(&tree).is_err());
    }

    #[test]
    fn test_mutation_json_shape() {
        let mutation = Mutation::MoveBlock {
            from_index: 0,
            to_index: 2,
        };
        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "op": "moveBlock", "fromIndex": 0, "toIndex": 2 })
        );
    }
}
