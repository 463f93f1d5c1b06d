//! Page block tree: block kinds, grid geometry, lookup and validation.
//!
//! Everything here is pure data plus tree algorithms. Editing state,
//! history and drag/drop live in `pagecraft-editor`.

pub mod block;
pub mod clone;
pub mod error;
pub mod grid;
pub mod id_generator;
pub mod locator;
pub mod patch;
pub mod tree;
pub mod validate;
pub mod visitor;

pub use block::{Block, BlockDefaults, BlockKind, BlockStyle, BlockType, ButtonVariant, EventBindings};
pub use clone::{clone_all_with_fresh_ids, clone_with_fresh_ids, repair_grids};
pub use error::{ModelError, ModelResult};
pub use grid::{
    checked_cell_count, reshape_cells, CellAlign, GridAlign, GridCell, GridJustify, GridSettings, PlacementType,
    MAX_GRID_CELLS,
};
pub use id_generator::{get_client_seed, IdGenerator};
pub use locator::{find_block, find_block_mut, locate, remove_block, Scope};
pub use patch::{BlockPatch, FooterPatch, GridSettingsPatch, HeaderPatch};
pub use tree::{is_reserved_id, BlockTree, Footer, Header, FOOTER_ID, HEADER_ID};
pub use validate::{validate_blocks, validate_tree};
pub use visitor::{Visitor, VisitorMut};
