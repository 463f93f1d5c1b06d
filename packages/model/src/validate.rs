//! Structural checks for trees loaded from outside (files, remote peers).
//!
//! A tree built only through the mutation operations always passes; these
//! checks exist for documents that arrive as raw JSON.

use crate::block::{Block, BlockKind};
use crate::error::{ModelError, ModelResult};
use crate::tree::{is_reserved_id, BlockTree};
use crate::visitor::{walk_block, walk_blocks, Visitor};
use std::collections::HashSet;

pub fn validate_tree(tree: &BlockTree) -> ModelResult<()> {
    validate_blocks(&tree.blocks, &HashSet::new())
}

/// Validate `blocks` as a payload about to join a tree whose ids are `taken`
pub fn validate_blocks(blocks: &[Block], taken: &HashSet<String>) -> ModelResult<()> {
    let mut checker = Checker {
        taken,
        seen: HashSet::new(),
        error: None,
    };
    walk_blocks(&mut checker, blocks);
    match checker.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct Checker<'a> {
    taken: &'a HashSet<String>,
    seen: HashSet<String>,
    error: Option<ModelError>,
}

impl Checker<'_> {
    fn check(&mut self, block: &Block) -> ModelResult<()> {
        if block.id.is_empty() {
            return Err(ModelError::EmptyId);
        }
        if is_reserved_id(&block.id) {
            return Err(ModelError::ReservedId(block.id.clone()));
        }
        if self.taken.contains(&block.id) || !self.seen.insert(block.id.clone()) {
            return Err(ModelError::DuplicateId(block.id.clone()));
        }
        if let BlockKind::Grid { settings, cells } = &block.kind {
            if !settings.is_within_limits() {
                return Err(ModelError::GridTooLarge {
                    columns: settings.columns,
                    rows: settings.rows,
                });
            }
            let expected = settings.cell_count();
            if cells.len() != expected {
                return Err(ModelError::GridShape {
                    grid_id: block.id.clone(),
                    expected,
                    actual: cells.len(),
                });
            }
        }
        Ok(())
    }
}

impl Visitor for Checker<'_> {
    fn visit_block(&mut self, block: &Block) {
        if self.error.is_some() {
            return;
        }
        match self.check(block) {
            Ok(()) => walk_block(self, block),
            Err(error) => self.error = Some(error),
        }
    }
}
