//! Clone-with-remap for template and generated payloads.
//!
//! Payload ids are only meaningful inside the payload, so every node gets a
//! fresh id on insertion. Parent/child relationships are kept by structure
//! (the clone has the same shape), never by looking old ids up.

use crate::block::{Block, BlockKind};
use crate::grid::repair_cells;
use crate::id_generator::IdGenerator;
use crate::visitor::{walk_block_mut, walk_blocks_mut, VisitorMut};

struct Remap<'a> {
    ids: &'a mut IdGenerator,
}

impl VisitorMut for Remap<'_> {
    fn visit_block_mut(&mut self, block: &mut Block) {
        block.id = self.ids.new_id(block.block_type());
        if let BlockKind::Grid { settings, cells } = &mut block.kind {
            repair_cells(cells, settings);
        }
        walk_block_mut(self, block);
    }
}

/// Deep-copy `block`, giving it and every descendant a fresh id.
/// Style, events and content are carried over untouched.
pub fn clone_with_fresh_ids(block: &Block, ids: &mut IdGenerator) -> Block {
    let mut copy = block.clone();
    Remap { ids }.visit_block_mut(&mut copy);
    copy
}

pub fn clone_all_with_fresh_ids(blocks: &[Block], ids: &mut IdGenerator) -> Vec<Block> {
    let mut copies = blocks.to_vec();
    walk_blocks_mut(&mut Remap { ids }, &mut copies);
    copies
}

struct GridRepair {
    repaired: usize,
}

impl VisitorMut for GridRepair {
    fn visit_block_mut(&mut self, block: &mut Block) {
        if let BlockKind::Grid { settings, cells } = &mut block.kind {
            if repair_cells(cells, settings) {
                self.repaired += 1;
            }
        }
        walk_block_mut(self, block);
    }
}

/// Bring every grid's cell array in line with its declared shape.
/// Returns how many grids needed fixing.
pub fn repair_grids(blocks: &mut [Block]) -> usize {
    let mut repair = GridRepair { repaired: 0 };
    walk_blocks_mut(&mut repair, blocks);
    repair.repaired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockStyle;
    use crate::grid::GridSettings;

    fn template() -> Vec<Block> {
        let mut title = Block::text("temp-title", "Hello");
        title.style = BlockStyle::new().with("fontSize", "48px");
        title
            .events
            .insert("onClick".to_string(), vec!["fn-7".to_string()]);

        vec![
            Block::container(
                "temp-container",
                vec![
                    title,
                    Block::grid("temp-grid", 2, 1, vec![Some(Block::text("temp-cell", ""))]),
                ],
            ),
            Block::text("temp-footer", "bye"),
        ]
    }

    #[test]
    fn test_every_node_gets_a_fresh_id() {
        let mut ids = IdGenerator::new("alice");
        let copies = clone_all_with_fresh_ids(&template(), &mut ids);

        let tree = crate::BlockTree::from_blocks(copies);
        let new_ids = tree.ids();
        assert_eq!(new_ids.len(), 5);
        assert!(new_ids.iter().all(|id| !id.starts_with("temp-")));
    }

    #[test]
    fn test_structure_and_payload_survive_the_clone() {
        let mut ids = IdGenerator::new("alice");
        let copies = clone_all_with_fresh_ids(&template(), &mut ids);

        let container = &copies[0];
        let title = &container.children().unwrap()[0];
        assert_eq!(title.style.get("fontSize"), Some("48px"));
        assert_eq!(title.events["onClick"], vec!["fn-7"]);

        let grid = &container.children().unwrap()[1];
        assert!(grid.cells().unwrap()[0].block.is_some());
        assert!(grid.cells().unwrap()[1].block.is_none());
    }

    #[test]
    fn test_cloning_twice_never_collides() {
        let mut ids = IdGenerator::new("alice");
        let first = clone_all_with_fresh_ids(&template(), &mut ids);
        let second = clone_all_with_fresh_ids(&template(), &mut ids);

        let mut all = crate::BlockTree::from_blocks(first).ids();
        all.extend(crate::BlockTree::from_blocks(second).ids());
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_malformed_grid_payload_is_repaired() {
        let mut grid = Block::grid("g", 2, 2, vec![]);
        if let BlockKind::Grid { cells, settings } = &mut grid.kind {
            cells.truncate(1);
            *settings = GridSettings::new(2, 2, 0, 0);
        }

        let mut ids = IdGenerator::new("alice");
        let copy = clone_with_fresh_ids(&grid, &mut ids);
        assert_eq!(copy.cells().unwrap().len(), 4);

        let mut blocks = vec![grid];
        assert_eq!(repair_grids(&mut blocks), 1);
        assert_eq!(blocks[0].cells().unwrap().len(), 4);
    }
}
