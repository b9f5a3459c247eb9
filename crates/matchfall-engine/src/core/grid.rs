use std::fmt;

use crate::GridError;

use super::{
    piece::{Piece, PieceKind},
    position::Position,
};

/// Fixed-size board storage, the sole owner of pieces and their positions.
///
/// Cells are stored densely in row-major order (`index = y * width + x`), so
/// the grid never allocates after construction. A cell is empty only
/// transiently while a resolve call is removing and refilling pieces; a grid
/// published by [`Board`](crate::Board) is always full.
///
/// # Example
///
/// ```
/// use matchfall_engine::{Grid, Position};
///
/// let grid = Grid::new(4, 3);
/// assert!(grid.is_within_bounds(3, 2));
/// assert!(!grid.is_within_bounds(4, 0));
/// assert!(grid.get(Position::new(-1, 0)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Option<Piece>>,
}

impl Grid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Checks whether raw coordinates address a cell of this grid.
    #[must_use]
    pub fn is_within_bounds(&self, x: i32, y: i32) -> bool {
        self.contains(Position::new(x, y))
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x()).ok()?;
        let y = usize::try_from(pos.y()).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    fn checked_index(&self, pos: Position) -> Result<usize, GridError> {
        self.index(pos).ok_or(GridError::OutOfBounds {
            position: pos,
            width: self.width,
            height: self.height,
        })
    }

    fn position_of(&self, index: usize) -> Position {
        self.position(index % self.width, index / self.width)
    }

    /// Converts in-grid column/row indices into a [`Position`].
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn position(&self, x: usize, y: usize) -> Position {
        debug_assert!(x < self.width && y < self.height);
        Position::new(x as i32, y as i32)
    }

    /// Returns the occupant of a cell.
    pub fn get(&self, pos: Position) -> Result<Option<Piece>, GridError> {
        self.checked_index(pos).map(|i| self.cells[i])
    }

    /// Returns the kind at `pos`, or `None` for empty or out-of-bounds cells.
    #[must_use]
    pub fn kind_at(&self, pos: Position) -> Option<PieceKind> {
        self.index(pos).and_then(|i| self.cells[i]).map(Piece::kind)
    }

    /// Exchanges the occupants of two edge-adjacent cells.
    ///
    /// Bounds are checked before adjacency. On error the grid is untouched.
    pub fn swap(&mut self, a: Position, b: Position) -> Result<(), GridError> {
        let ia = self.checked_index(a)?;
        let ib = self.checked_index(b)?;
        if !a.is_adjacent(b) {
            return Err(GridError::NotAdjacent { a, b });
        }
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Puts a piece into a cell, returning the previous occupant.
    pub(crate) fn place(&mut self, pos: Position, piece: Piece) -> Option<Piece> {
        debug_assert!(self.contains(pos), "placing outside the grid at {pos}");
        let i = self.index(pos)?;
        self.cells[i].replace(piece)
    }

    /// Empties a cell, returning its occupant.
    pub(crate) fn take(&mut self, pos: Position) -> Option<Piece> {
        let i = self.index(pos)?;
        self.cells[i].take()
    }

    /// Enumerates occupied cells in row-major order.
    ///
    /// The iterator borrows the grid; call again to restart.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.cells()
            .filter_map(|(pos, cell)| cell.map(|piece| (pos, piece)))
    }

    /// Enumerates every cell, empty or not, in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Option<Piece>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (self.position_of(i), *cell))
    }

    /// Enumerates the cells of column `x` from top to bottom.
    ///
    /// Yields nothing if `x` is outside the grid.
    pub fn column(&self, x: usize) -> impl Iterator<Item = (Position, Option<Piece>)> + '_ {
        let len = if x < self.width { self.height } else { 0 };
        (0..len).map(move |y| {
            let i = y * self.width + x;
            (self.position_of(i), self.cells[i])
        })
    }

    /// Returns the rows of the grid from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<Piece>]> + '_ {
        // `chunks` panics on a zero chunk size; zero-width grids have no rows.
        self.cells.chunks(self.width.max(1))
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Snapshot of the kinds in row-major order, ignoring piece identities.
    #[must_use]
    pub fn kinds(&self) -> Vec<Option<PieceKind>> {
        self.cells.iter().map(|cell| cell.map(Piece::kind)).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for cell in row {
                let c = cell.map_or('.', |piece| piece.kind().as_char());
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::PieceId;

    /// Builds a full grid from rows of kind characters; ids are row-major.
    pub(crate) fn grid_from_rows(rows: &[&str]) -> Grid {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        let mut grid = Grid::new(width, height);
        let mut next_id = 0;
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let pos = Position::new(x.try_into().unwrap(), y.try_into().unwrap());
                if let Some(kind) = PieceKind::from_char(c) {
                    grid.place(pos, Piece::new(PieceId::new(next_id), kind));
                    next_id += 1;
                }
            }
        }
        grid
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.occupied_count(), 0);
        assert!(!grid.is_full());
        assert_eq!(grid.pieces().count(), 0);
        assert_eq!(grid.cells().count(), 20);
    }

    #[test]
    fn test_bounds() {
        let grid = Grid::new(3, 2);
        assert!(grid.is_within_bounds(0, 0));
        assert!(grid.is_within_bounds(2, 1));
        assert!(!grid.is_within_bounds(3, 1));
        assert!(!grid.is_within_bounds(2, 2));
        assert!(!grid.is_within_bounds(-1, 0));
        assert!(!grid.is_within_bounds(0, -1));

        let err = grid.get(Position::new(3, 0)).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                position: Position::new(3, 0),
                width: 3,
                height: 2,
            }
        );
    }

    #[test]
    fn test_swap_adjacent() {
        let mut grid = grid_from_rows(&["AB", "CD"]);
        grid.swap(Position::new(0, 0), Position::new(1, 0)).unwrap();
        assert_eq!(grid.to_string(), "BA\nCD\n");
        grid.swap(Position::new(1, 1), Position::new(1, 0)).unwrap();
        assert_eq!(grid.to_string(), "BD\nCA\n");
    }

    #[test]
    fn test_swap_keeps_identity() {
        let mut grid = grid_from_rows(&["AB"]);
        let a = grid.get(Position::new(0, 0)).unwrap().unwrap();
        grid.swap(Position::new(0, 0), Position::new(1, 0)).unwrap();
        assert_eq!(grid.get(Position::new(1, 0)).unwrap(), Some(a));
    }

    #[test]
    fn test_swap_rejects_non_adjacent() {
        let mut grid = grid_from_rows(&["ABC", "DEF"]);
        let before = grid.clone();

        let err = grid
            .swap(Position::new(0, 0), Position::new(2, 0))
            .unwrap_err();
        assert!(err.is_not_adjacent());
        let err = grid
            .swap(Position::new(0, 0), Position::new(1, 1))
            .unwrap_err();
        assert!(err.is_not_adjacent(), "diagonal swaps are rejected");
        let err = grid
            .swap(Position::new(1, 1), Position::new(1, 1))
            .unwrap_err();
        assert!(err.is_not_adjacent());

        assert_eq!(grid, before);
    }

    #[test]
    fn test_swap_rejects_out_of_bounds() {
        let mut grid = grid_from_rows(&["ABC"]);
        let before = grid.clone();
        let err = grid
            .swap(Position::new(2, 0), Position::new(3, 0))
            .unwrap_err();
        assert!(err.is_out_of_bounds());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_pieces_row_major() {
        let grid = grid_from_rows(&["AB", "CD"]);
        let order: Vec<_> = grid
            .pieces()
            .map(|(pos, piece)| (pos, piece.kind().as_char()))
            .collect();
        assert_eq!(
            order,
            [
                (Position::new(0, 0), 'A'),
                (Position::new(1, 0), 'B'),
                (Position::new(0, 1), 'C'),
                (Position::new(1, 1), 'D'),
            ]
        );
        // Restartable
        assert_eq!(grid.pieces().count(), 4);
    }

    #[test]
    fn test_column_top_to_bottom() {
        let grid = grid_from_rows(&["AB", "CD", "EF"]);
        let column: Vec<_> = grid
            .column(1)
            .map(|(pos, cell)| (pos, cell.map(|p| p.kind().as_char())))
            .collect();
        assert_eq!(
            column,
            [
                (Position::new(1, 0), Some('B')),
                (Position::new(1, 1), Some('D')),
                (Position::new(1, 2), Some('F')),
            ]
        );
        assert_eq!(grid.column(2).count(), 0);
    }

    #[test]
    fn test_take_and_place() {
        let mut grid = grid_from_rows(&["AB"]);
        let piece = grid.take(Position::new(0, 0)).unwrap();
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.to_string(), ".B\n");
        assert_eq!(grid.place(Position::new(0, 0), piece), None);
        assert!(grid.is_full());
    }
}
