use std::cmp::Ordering;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// A cell coordinate on the board.
///
/// # Coordinate System
///
/// - (0, 0) is the top-left cell
/// - X increases rightward (columns)
/// - Y increases downward (rows); gravity pulls toward larger Y
///
/// Coordinates are signed so that spawn origins above the board (negative Y)
/// and raw input coordinates outside the grid can be represented and then
/// rejected by bounds checks.
///
/// Positions order row-major (by Y, then X), which is also the order
/// [`Grid::pieces`](super::grid::Grid::pieces) enumerates cells in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, Serialize, Deserialize)]
#[display("({x}, {y})")]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    /// Returns `true` if `other` shares an edge with this position.
    #[must_use]
    pub const fn is_adjacent(self, other: Position) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    /// Returns the four edge-adjacent positions (up, right, down, left).
    ///
    /// Positions outside the grid are included; callers filter them.
    #[must_use]
    pub fn neighbors(self) -> ArrayVec<Position, 4> {
        [
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x - 1, self.y),
        ]
        .into()
    }

    /// Returns the position `rows` cells above this one.
    #[must_use]
    pub const fn above(self, rows: i32) -> Self {
        Self::new(self.x, self.y - rows)
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<[i32; 2]> for Position {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Position> for [i32; 2] {
    fn from(pos: Position) -> Self {
        [pos.x, pos.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency() {
        let pos = Position::new(3, 4);
        assert!(pos.is_adjacent(Position::new(3, 3)));
        assert!(pos.is_adjacent(Position::new(4, 4)));
        assert!(pos.is_adjacent(Position::new(3, 5)));
        assert!(pos.is_adjacent(Position::new(2, 4)));

        assert!(!pos.is_adjacent(pos));
        assert!(!pos.is_adjacent(Position::new(4, 5)), "diagonal is not adjacent");
        assert!(!pos.is_adjacent(Position::new(5, 4)));
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let pos = Position::new(0, 0);
        let neighbors = pos.neighbors();
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.iter().all(|n| pos.is_adjacent(*n)));
    }

    #[test]
    fn test_row_major_order() {
        let mut positions = vec![
            Position::new(2, 1),
            Position::new(0, 1),
            Position::new(5, 0),
            Position::new(1, 2),
        ];
        positions.sort();
        assert_eq!(
            positions,
            [
                Position::new(5, 0),
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 2),
            ]
        );
    }

    #[test]
    fn test_serialization() {
        let pos = Position::new(4, -2);
        let serialized = serde_json::to_string(&pos).unwrap();
        assert_eq!(serialized, "[4,-2]");
        let deserialized: Position = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, pos);
        assert_eq!(pos.to_string(), "(4, -2)");
    }
}
