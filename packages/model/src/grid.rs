//! Grid geometry: settings, cells and shape re-derivation.
//!
//! A grid always owns exactly `columns * rows` cells, stored row-major.
//! Changing the shape never reflows content: a cell keeps its block when
//! its `(row, col)` position exists in both the old and the new shape.

use crate::block::Block;
use serde::{Deserialize, Serialize};

/// Largest cell array a grid may own
pub const MAX_GRID_CELLS: usize = 10_000;

/// `columns * rows` (each clamped to at least one), if it fits under
/// [`MAX_GRID_CELLS`]
pub fn checked_cell_count(columns: u32, rows: u32) -> Option<usize> {
    (columns.max(1) as usize)
        .checked_mul(rows.max(1) as usize)
        .filter(|count| *count <= MAX_GRID_CELLS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridAlign {
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridJustify {
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementType {
    Auto,
    Fixed,
    Fraction,
}

/// Per-cell alignment override (both axes share the same vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellAlign {
    Start,
    Center,
    End,
    Stretch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub columns: u32,
    pub rows: u32,
    #[serde(default)]
    pub gap_x: u32,
    #[serde(default)]
    pub gap_y: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<GridAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify: Option<GridJustify>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_type: Option<PlacementType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_cell_borders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_border_width: Option<u32>,
}

impl GridSettings {
    /// Shape is clamped to at least one row and one column
    pub fn new(columns: u32, rows: u32, gap_x: u32, gap_y: u32) -> Self {
        Self {
            columns: columns.max(1),
            rows: rows.max(1),
            gap_x,
            gap_y,
            align: None,
            justify: None,
            placement_type: None,
            show_cell_borders: None,
            cell_border_color: None,
            cell_border_width: None,
        }
    }

    pub fn cell_count(&self) -> usize {
        (self.columns.max(1) as usize).saturating_mul(self.rows.max(1) as usize)
    }

    /// Whether the shape stays under [`MAX_GRID_CELLS`]
    pub fn is_within_limits(&self) -> bool {
        checked_cell_count(self.columns, self.rows).is_some()
    }

    /// Flat index of `(row, col)`, if inside the shape
    pub fn index_of(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.rows || col >= self.columns {
            return None;
        }
        (row as usize)
            .checked_mul(self.columns as usize)?
            .checked_add(col as usize)
    }

    /// `(row, col)` of a flat index, if inside the shape
    pub fn position_of(&self, index: usize) -> Option<(u32, u32)> {
        (index < self.cell_count()).then(|| {
            let columns = self.columns.max(1) as usize;
            ((index / columns) as u32, (index % columns) as u32)
        })
    }
}

/// One grid slot. Holds at most one block, which may itself nest further.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    #[serde(default)]
    pub block: Option<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<CellAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify: Option<CellAlign>,
}

impl GridCell {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_block(block: Option<Block>) -> Self {
        Self {
            block,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }
}

/// Re-derive `cells` for a shape change from `old` to `new`.
///
/// Cells whose `(row, col)` survives keep their content and alignment,
/// cells outside the new shape are dropped, new positions start empty.
pub fn reshape_cells(cells: Vec<GridCell>, old: &GridSettings, new: &GridSettings) -> Vec<GridCell> {
    let mut reshaped = vec![GridCell::empty(); new.cell_count()];

    for (index, cell) in cells.into_iter().enumerate() {
        let Some((row, col)) = old.position_of(index) else {
            continue;
        };
        if let Some(target) = new.index_of(row, col) {
            reshaped[target] = cell;
        }
    }

    reshaped
}

/// Pad or truncate `cells` to match `settings`. Used for untrusted payloads
/// where the cell array may not agree with the declared shape.
///
/// Oversized shapes are left alone for validation to reject.
pub fn repair_cells(cells: &mut Vec<GridCell>, settings: &GridSettings) -> bool {
    let expected = settings.cell_count();
    if cells.len() == expected || !settings.is_within_limits() {
        return false;
    }
    cells.resize(expected, GridCell::empty());
    true
}
