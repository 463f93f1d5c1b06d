//! Named editing operations.
//!
//! Each operation builds one fully materialized [`Mutation`] (fresh ids are
//! minted here, never during apply) and commits it. Nothing is reported to
//! the user: an operation that cannot apply returns `None` and leaves the
//! document exactly as it was.

use crate::{Document, Mutation, MutationResult};
use pagecraft_model::{
    Block, BlockPatch, BlockType, CellAlign, FooterPatch, GridSettingsPatch, HeaderPatch,
};
use tracing::debug;

impl Document {
    /// Append a new default block to the top level
    pub fn add_block(&mut self, block_type: BlockType) -> Option<MutationResult> {
        let block = self.mint(block_type);
        self.commit(Mutation::InsertBlocks {
            index: None,
            blocks: vec![block],
        })
    }

    /// Insert a new default block into the top level at `index`
    pub fn insert_block(&mut self, index: usize, block_type: BlockType) -> Option<MutationResult> {
        let block = self.mint(block_type);
        self.commit(Mutation::InsertBlocks {
            index: Some(index),
            blocks: vec![block],
        })
    }

    pub fn add_block_to_container(
        &mut self,
        container_id: &str,
        index: usize,
        block_type: BlockType,
    ) -> Option<MutationResult> {
        let block = self.mint(block_type);
        self.commit(Mutation::InsertIntoContainer {
            container_id: container_id.to_string(),
            index,
            blocks: vec![block],
        })
    }

    /// Place a new default block into a grid cell, replacing its content
    pub fn add_block_to_grid_cell(
        &mut self,
        grid_id: &str,
        cell_index: usize,
        block_type: BlockType,
    ) -> Option<MutationResult> {
        let block = self.mint(block_type);
        self.commit(Mutation::SetGridCellBlock {
            grid_id: grid_id.to_string(),
            cell_index,
            block,
        })
    }

    /// Append a copy of a template payload to the top level
    pub fn add_template_blocks(&mut self, blocks: &[Block]) -> Option<MutationResult> {
        let blocks = self.fresh_copies(blocks);
        self.commit(Mutation::InsertBlocks {
            index: None,
            blocks,
        })
    }

    /// Splice a copy of a template payload into the top level at `index`
    pub fn insert_template_blocks(&mut self, index: usize, blocks: &[Block]) -> Option<MutationResult> {
        let blocks = self.fresh_copies(blocks);
        self.commit(Mutation::InsertBlocks {
            index: Some(index),
            blocks,
        })
    }

    pub fn add_template_to_container(
        &mut self,
        container_id: &str,
        index: usize,
        blocks: &[Block],
    ) -> Option<MutationResult> {
        let blocks = self.fresh_copies(blocks);
        self.commit(Mutation::InsertIntoContainer {
            container_id: container_id.to_string(),
            index,
            blocks,
        })
    }

    /// A cell holds one block, so only the template's first block is placed
    pub fn add_template_to_grid_cell(
        &mut self,
        grid_id: &str,
        cell_index: usize,
        blocks: &[Block],
    ) -> Option<MutationResult> {
        let Some(first) = blocks.first() else {
            debug!(grid_id, "Empty template dropped on grid cell");
            return None;
        };
        let block = self.fresh_copy(first);
        self.commit(Mutation::SetGridCellBlock {
            grid_id: grid_id.to_string(),
            cell_index,
            block,
        })
    }

    pub fn move_block(&mut self, from_index: usize, to_index: usize) -> Option<MutationResult> {
        self.commit(Mutation::MoveBlock {
            from_index,
            to_index,
        })
    }

    pub fn move_grid_item(
        &mut self,
        grid_id: &str,
        from_cell_index: usize,
        to_cell_index: usize,
    ) -> Option<MutationResult> {
        self.commit(Mutation::MoveGridItem {
            grid_id: grid_id.to_string(),
            from_cell_index,
            to_cell_index,
        })
    }

    pub fn move_grid_item_across(
        &mut self,
        from_grid_id: &str,
        from_cell_index: usize,
        to_grid_id: &str,
        to_cell_index: usize,
    ) -> Option<MutationResult> {
        self.commit(Mutation::MoveGridItemAcross {
            from_grid_id: from_grid_id.to_string(),
            from_cell_index,
            to_grid_id: to_grid_id.to_string(),
            to_cell_index,
        })
    }

    pub fn update_block(&mut self, id: &str, patch: BlockPatch) -> Option<MutationResult> {
        self.commit(Mutation::UpdateBlock {
            id: id.to_string(),
            patch,
        })
    }

    pub fn update_grid_settings(&mut self, grid_id: &str, patch: GridSettingsPatch) -> Option<MutationResult> {
        self.commit(Mutation::UpdateGridSettings {
            grid_id: grid_id.to_string(),
            patch,
        })
    }

    pub fn update_grid_cell_align(
        &mut self,
        grid_id: &str,
        cell_index: usize,
        align: Option<CellAlign>,
        justify: Option<CellAlign>,
    ) -> Option<MutationResult> {
        self.commit(Mutation::UpdateGridCellAlign {
            grid_id: grid_id.to_string(),
            cell_index,
            align,
            justify,
        })
    }

    pub fn delete_block(&mut self, id: &str) -> Option<MutationResult> {
        self.commit(Mutation::DeleteBlock { id: id.to_string() })
    }

    pub fn update_header(&mut self, patch: HeaderPatch) -> Option<MutationResult> {
        self.commit(Mutation::UpdateHeader { patch })
    }

    pub fn update_footer(&mut self, patch: FooterPatch) -> Option<MutationResult> {
        self.commit(Mutation::UpdateFooter { patch })
    }
}
