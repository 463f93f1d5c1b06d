//! # Tree Locator
//!
//! Read-only and in-place lookups by block id.
//!
//! Search order is deterministic: top-level blocks in sequence order, and
//! for each block its own id before anything it owns (container children in
//! order, grid cells in index order). Ids are unique, so at most one match
//! exists; the order only matters for reproducibility.

use crate::block::{Block, BlockKind};
use serde::{Deserialize, Serialize};

/// Where a block lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Scope {
    /// The top-level sequence at `index`
    TopLevel { index: usize },
    /// A container's children at `index`
    Container { container_id: String, index: usize },
    /// A grid's flat cell index
    GridCell { grid_id: String, cell_index: usize },
}

/// Find a block anywhere in the tree and report its containing scope
pub fn locate<'a>(blocks: &'a [Block], id: &str) -> Option<(&'a Block, Scope)> {
    for (index, block) in blocks.iter().enumerate() {
        if block.id == id {
            return Some((block, Scope::TopLevel { index }));
        }
        if let Some(found) = locate_within(block, id) {
            return Some(found);
        }
    }
    None
}

fn locate_within<'a>(parent: &'a Block, id: &str) -> Option<(&'a Block, Scope)> {
    match &parent.kind {
        BlockKind::Container { children } => {
            for (index, child) in children.iter().enumerate() {
                if child.id == id {
                    let scope = Scope::Container {
                        container_id: parent.id.clone(),
                        index,
                    };
                    return Some((child, scope));
                }
                if let Some(found) = locate_within(child, id) {
                    return Some(found);
                }
            }
            None
        }
        BlockKind::Grid { cells, .. } => {
            for (cell_index, cell) in cells.iter().enumerate() {
                let Some(inner) = &cell.block else {
                    continue;
                };
                if inner.id == id {
                    let scope = Scope::GridCell {
                        grid_id: parent.id.clone(),
                        cell_index,
                    };
                    return Some((inner, scope));
                }
                if let Some(found) = locate_within(inner, id) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

pub fn find_block<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    locate(blocks, id).map(|(block, _)| block)
}

pub fn find_block_mut<'a>(blocks: &'a mut [Block], id: &str) -> Option<&'a mut Block> {
    blocks.iter_mut().find_map(|block| {
        if block.id == id {
            Some(block)
        } else {
            find_within_mut(block, id)
        }
    })
}

fn find_within_mut<'a>(parent: &'a mut Block, id: &str) -> Option<&'a mut Block> {
    match &mut parent.kind {
        BlockKind::Container { children } => find_block_mut(children, id),
        BlockKind::Grid { cells, .. } => cells
            .iter_mut()
            .filter_map(|cell| cell.block.as_mut())
            .find_map(|inner| {
                if inner.id == id {
                    Some(inner)
                } else {
                    find_within_mut(inner, id)
                }
            }),
        _ => None,
    }
}

/// Detach a block from wherever it lives.
///
/// A block inside a grid leaves its cell behind, empty. A block in a
/// sequence is removed from it.
pub fn remove_block(blocks: &mut Vec<Block>, id: &str) -> Option<Block> {
    if let Some(pos) = blocks.iter().position(|b| b.id == id) {
        return Some(blocks.remove(pos));
    }

    for block in blocks.iter_mut() {
        if let Some(removed) = remove_within(block, id) {
            return Some(removed);
        }
    }

    None
}

fn remove_within(parent: &mut Block, id: &str) -> Option<Block> {
    match &mut parent.kind {
        BlockKind::Container { children } => remove_block(children, id),
        BlockKind::Grid { cells, .. } => {
            for cell in cells.iter_mut() {
                if cell.block.as_ref().is_some_and(|b| b.id == id) {
                    return cell.block.take();
                }
                if let Some(inner) = cell.block.as_mut() {
                    if let Some(removed) = remove_within(inner, id) {
                        return Some(removed);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Block> {
        vec![
            Block::text("a", "top"),
            Block::container(
                "c1",
                vec![
                    Block::text("c1-t", ""),
                    Block::grid(
                        "g-1",
                        2,
                        1,
                        vec![None, Some(Block::container("deep", vec![Block::text("leaf", "")]))],
                    ),
                ],
            ),
        ]
    }

    #[test]
    fn test_locate_reports_scope() {
        let blocks = sample();

        let (_, scope) = locate(&blocks, "a").unwrap();
        assert_eq!(scope, Scope::TopLevel { index: 0 });

        let (_, scope) = locate(&blocks, "g-1").unwrap();
        assert_eq!(
            scope,
            Scope::Container {
                container_id: "c1".to_string(),
                index: 1
            }
        );

        let (_, scope) = locate(&blocks, "deep").unwrap();
        assert_eq!(
            scope,
            Scope::GridCell {
                grid_id: "g-1".to_string(),
                cell_index: 1
            }
        );

        let (block, scope) = locate(&blocks, "leaf").unwrap();
        assert_eq!(block.id, "leaf");
        assert_eq!(
            scope,
            Scope::Container {
                container_id: "deep".to_string(),
                index: 0
            }
        );

        assert!(locate(&blocks, "missing").is_none());
    }

    #[test]
    fn test_find_block_mut_reaches_grid_cells() {
        let mut blocks = sample();
        let leaf = find_block_mut(&mut blocks, "leaf").unwrap();
        leaf.html_id = Some("anchor".to_string());

        assert_eq!(
            find_block(&blocks, "leaf").unwrap().html_id.as_deref(),
            Some("anchor")
        );
    }

    #[test]
    fn test_remove_from_grid_leaves_empty_cell() {
        let mut blocks = sample();
        let removed = remove_block(&mut blocks, "deep").unwrap();
        assert_eq!(removed.subtree_size(), 2);

        let grid = find_block(&blocks, "g-1").unwrap();
        let cells = grid.cells().unwrap();
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_remove_from_container_shifts_siblings() {
        let mut blocks = sample();
        remove_block(&mut blocks, "c1-t").unwrap();

        let (_, scope) = locate(&blocks, "g-1").unwrap();
        assert_eq!(
            scope,
            Scope::Container {
                container_id: "c1".to_string(),
                index: 0
            }
        );
    }
}
