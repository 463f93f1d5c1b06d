use crate::block::{Block, BlockKind};
use crate::grid::GridCell;

/// Visitor pattern for traversing the block tree immutably
///
/// Default implementations walk the entire tree depth-first, visiting a
/// block before anything it owns. Override specific visit_* methods to act
/// on nodes; call the matching walk_* function to keep descending.
pub trait Visitor: Sized {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_cell(&mut self, cell: &GridCell) {
        walk_cell(self, cell);
    }
}

/// Mutable visitor pattern for transforming blocks in place
pub trait VisitorMut: Sized {
    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_cell_mut(&mut self, cell: &mut GridCell) {
        walk_cell_mut(self, cell);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_blocks<V: Visitor>(visitor: &mut V, blocks: &[Block]) {
    for block in blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    match &block.kind {
        BlockKind::Container { children } => walk_blocks(visitor, children),
        BlockKind::Grid { cells, .. } => {
            for cell in cells {
                visitor.visit_cell(cell);
            }
        }
        BlockKind::Text { .. }
        | BlockKind::Image { .. }
        | BlockKind::Button { .. }
        | BlockKind::Video { .. } => {
            // Leaf blocks
        }
    }
}

pub fn walk_cell<V: Visitor>(visitor: &mut V, cell: &GridCell) {
    if let Some(block) = &cell.block {
        visitor.visit_block(block);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_blocks_mut<V: VisitorMut>(visitor: &mut V, blocks: &mut [Block]) {
    for block in blocks {
        visitor.visit_block_mut(block);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    match &mut block.kind {
        BlockKind::Container { children } => walk_blocks_mut(visitor, children),
        BlockKind::Grid { cells, .. } => {
            for cell in cells {
                visitor.visit_cell_mut(cell);
            }
        }
        BlockKind::Text { .. }
        | BlockKind::Image { .. }
        | BlockKind::Button { .. }
        | BlockKind::Video { .. } => {
            // Leaf blocks
        }
    }
}

pub fn walk_cell_mut<V: VisitorMut>(visitor: &mut V, cell: &mut GridCell) {
    if let Some(block) = &mut cell.block {
        visitor.visit_block_mut(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CellCounter {
        cells: usize,
        occupied: usize,
    }

    impl Visitor for CellCounter {
        fn visit_cell(&mut self, cell: &GridCell) {
            self.cells += 1;
            if !cell.is_empty() {
                self.occupied += 1;
            }
            walk_cell(self, cell);
        }
    }

    #[test]
    fn test_visitor_reaches_cells_inside_containers() {
        let inner = Block::grid("inner", 1, 2, vec![Some(Block::text("x", ""))]);
        let outer = Block::grid("outer", 2, 1, vec![Some(Block::container("c", vec![inner])), None]);

        let mut counter = CellCounter { cells: 0, occupied: 0 };
        walk_blocks(&mut counter, &[outer]);

        assert_eq!(counter.cells, 4);
        assert_eq!(counter.occupied, 2);
    }

    struct Uppercase;

    impl VisitorMut for Uppercase {
        fn visit_block_mut(&mut self, block: &mut Block) {
            if let BlockKind::Text { content } = &mut block.kind {
                *content = content.to_uppercase();
            }
            walk_block_mut(self, block);
        }
    }

    #[test]
    fn test_mutable_visitor_rewrites_nested_blocks() {
        let mut blocks = vec![Block::container("c", vec![Block::text("t", "hello")])];
        walk_blocks_mut(&mut Uppercase, &mut blocks);

        match &blocks[0].children().unwrap()[0].kind {
            BlockKind::Text { content } => assert_eq!(content, "HELLO"),
            other => panic!("Expected text, got {:?}", other),
        }
    }
}
