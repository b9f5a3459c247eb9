pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Rejected grid access or swap request.
///
/// Both variants describe caller bugs: input should be bounds-checked with
/// [`Grid::is_within_bounds`] before it reaches the engine. The grid is never
/// mutated when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum GridError {
    #[display("position {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        position: Position,
        width: usize,
        height: usize,
    },
    #[display("positions {a} and {b} are not adjacent")]
    NotAdjacent { a: Position, b: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum BoardError {
    #[display("invalid swap request: {_0}")]
    Grid(GridError),
    #[display("cascade did not settle within {limit} rounds")]
    CascadeLimit { limit: usize },
}

impl From<GridError> for BoardError {
    fn from(err: GridError) -> Self {
        BoardError::Grid(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("grid dimensions {width}x{height} must be within 1..={max}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        max: usize,
    },
    #[display("number of piece kinds must be within {min}..={max}, got {num_kinds}")]
    InvalidKindCount { num_kinds: u8, min: u8, max: u8 },
    #[display("max cascade rounds must be at least 1")]
    ZeroCascadeLimit,
    #[display("layout has {actual} rows, expected {expected}")]
    LayoutHeight { expected: usize, actual: usize },
    #[display("layout row {row} has {actual} cells, expected {expected}")]
    LayoutWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("unknown piece kind {symbol:?} at {position}")]
    UnknownKind { symbol: char, position: Position },
    #[display("layout already contains a match at {position}")]
    UnstableLayout { position: Position },
}
