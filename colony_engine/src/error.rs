use crate::grid::Position;
use thiserror::Error;

/// Reasons a colony refuses to start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("the grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("ants must be able to carry at least one unit of food")]
    ZeroCarryCapacity,

    #[error("food sites must start with at least one unit of food")]
    ZeroFoodCapacity,

    #[error("the pheromone deposit must be a positive amount, got {0}")]
    InvalidPheromoneDeposit(f64),

    #[error("the evaporation coefficient must be in [0, 1), got {0}")]
    InvalidEvaporation(f64),

    #[error("home {home} is outside of the {rows}x{cols} grid")]
    HomeOutOfBounds {
        home: Position,
        rows: usize,
        cols: usize,
    },

    #[error("a {rows}x{cols} grid is too large")]
    GridTooLarge { rows: usize, cols: usize },

    #[error("not enough cells: {required} are needed but the grid only has {available}")]
    NotEnoughCells { required: usize, available: usize },

    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a text layout could not be turned into a colony.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout is missing the `{0}` header")]
    MissingHeader(&'static str),

    #[error("layout header `{name}` has an invalid value `{value}`")]
    InvalidHeader { name: &'static str, value: String },

    #[error("the layout grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },

    #[error("layout declares {expected} rows but has {found}")]
    RowCount { expected: usize, found: usize },

    #[error("row {row} of the layout has {found} cells, expected {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell `{value}` at {position}")]
    UnknownCell { value: char, position: Position },

    #[error("layout has no home cell")]
    MissingHome,

    #[error("layout has a second home cell at {0}")]
    DuplicateHome(Position),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
