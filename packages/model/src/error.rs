use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Block has an empty id")]
    EmptyId,

    #[error("Block id is reserved: {0}")]
    ReservedId(String),

    #[error("Duplicate block id: {0}")]
    DuplicateId(String),

    #[error("Grid {grid_id} has {actual} cells, expected {expected}")]
    GridShape {
        grid_id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Grid shape {columns}x{rows} exceeds the cell limit")]
    GridTooLarge { columns: u32, rows: u32 },

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
}
