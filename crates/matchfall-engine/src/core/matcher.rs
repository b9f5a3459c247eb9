//! Match detection over a [`Grid`].
//!
//! A *run* is a maximal sequence of edge-adjacent cells of the same kind
//! along one row or one column. Runs of [`MIN_RUN_LENGTH`] or more cells are
//! matches. Rows and columns are scanned independently with run-length
//! encoding; empty cells break runs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{grid::Grid, piece::PieceKind, position::Position};

/// Shortest run that counts as a match.
pub const MIN_RUN_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    const fn step(self) -> (i32, i32) {
        match self {
            Axis::Horizontal => (1, 0),
            Axis::Vertical => (0, 1),
        }
    }
}

/// A matched run: `len` cells of `kind` starting at `start` along `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub start: Position,
    pub len: usize,
    pub axis: Axis,
    pub kind: PieceKind,
}

impl Run {
    /// Enumerates the cells covered by the run.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let (dx, dy) = self.axis.step();
        (0..self.len).scan(self.start, move |pos, _| {
            let current = *pos;
            *pos = Position::new(pos.x() + dx, pos.y() + dy);
            Some(current)
        })
    }
}

/// Finds every run of at least [`MIN_RUN_LENGTH`] cells.
///
/// Horizontal runs come first (top row to bottom row), then vertical runs
/// (left column to right column).
#[must_use]
pub fn find_runs(grid: &Grid) -> Vec<Run> {
    let mut runs = vec![];
    for (axis, lines, line_len) in [
        (Axis::Horizontal, grid.height(), grid.width()),
        (Axis::Vertical, grid.width(), grid.height()),
    ] {
        for line in 0..lines {
            scan_line(grid, axis, line, line_len, &mut runs);
        }
    }
    runs
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn scan_line(grid: &Grid, axis: Axis, line: usize, line_len: usize, runs: &mut Vec<Run>) {
    let at = |i: usize| match axis {
        Axis::Horizontal => Position::new(i as i32, line as i32),
        Axis::Vertical => Position::new(line as i32, i as i32),
    };

    let mut start = 0;
    let mut current = None;
    // One step past the end flushes the final run.
    for i in 0..=line_len {
        let kind = if i < line_len { grid.kind_at(at(i)) } else { None };
        if kind.is_some() && kind == current {
            continue;
        }
        if let Some(run_kind) = current {
            let len = i - start;
            if len >= MIN_RUN_LENGTH {
                runs.push(Run {
                    start: at(start),
                    len,
                    axis,
                    kind: run_kind,
                });
            }
        }
        start = i;
        current = kind;
    }
}

/// Finds every cell that belongs to at least one match.
///
/// Cells shared by a horizontal and a vertical run appear once. The set
/// iterates in row-major order, but callers should not depend on it.
#[must_use]
pub fn find_matches(grid: &Grid) -> BTreeSet<Position> {
    find_runs(grid)
        .iter()
        .flat_map(Run::positions)
        .collect()
}

/// Checks whether putting `kind` at `pos` would complete a run with the
/// currently occupied cells around it.
///
/// The cell at `pos` itself is ignored, so this can be asked both for empty
/// cells and for cells whose occupant is about to be replaced.
#[must_use]
pub fn completes_run(grid: &Grid, pos: Position, kind: PieceKind) -> bool {
    let count = |dx: i32, dy: i32| {
        (1..)
            .map(|step| Position::new(pos.x() + dx * step, pos.y() + dy * step))
            .take_while(|p| grid.kind_at(*p) == Some(kind))
            .count()
    };
    let horizontal = count(-1, 0) + 1 + count(1, 0);
    let vertical = count(0, -1) + 1 + count(0, 1);
    horizontal >= MIN_RUN_LENGTH || vertical >= MIN_RUN_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::tests::grid_from_rows;

    fn positions(list: &[(i32, i32)]) -> BTreeSet<Position> {
        list.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    #[test]
    fn test_no_matches() {
        let grid = grid_from_rows(&["AAB", "BBA", "AAB"]);
        assert!(find_matches(&grid).is_empty());
        assert!(find_runs(&grid).is_empty());
    }

    #[test]
    fn test_empty_grid() {
        assert!(find_matches(&Grid::new(0, 0)).is_empty());
        assert!(find_matches(&Grid::new(4, 4)).is_empty());
    }

    #[test]
    fn test_horizontal_run() {
        let grid = grid_from_rows(&["ABBBA", "BACAB"]);
        assert_eq!(find_matches(&grid), positions(&[(1, 0), (2, 0), (3, 0)]));

        let runs = find_runs(&grid);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len, 3);
        assert!(runs[0].axis.is_horizontal());
        assert_eq!(runs[0].kind.as_char(), 'B');
    }

    #[test]
    fn test_vertical_run() {
        let grid = grid_from_rows(&["AB", "CB", "AB", "CA"]);
        assert_eq!(find_matches(&grid), positions(&[(1, 0), (1, 1), (1, 2)]));
    }

    #[test]
    fn test_full_width_run() {
        let grid = grid_from_rows(&["AAAAA"]);
        let runs = find_runs(&grid);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len, 5);
        assert_eq!(find_matches(&grid).len(), 5);
    }

    #[test]
    fn test_full_height_run() {
        let grid = grid_from_rows(&["A", "A", "A"]);
        assert_eq!(find_matches(&grid).len(), 3);
    }

    #[test]
    fn test_crossing_runs_share_cell() {
        let grid = grid_from_rows(&["BAB", "AAA", "BAB"]);
        let matches = find_matches(&grid);
        assert_eq!(
            matches,
            positions(&[(0, 1), (1, 1), (2, 1), (1, 0), (1, 2)])
        );
        assert_eq!(find_runs(&grid).len(), 2);
    }

    #[test]
    fn test_empty_cells_break_runs() {
        let mut grid = grid_from_rows(&["AAAA"]);
        grid.take(Position::new(1, 0));
        assert!(find_matches(&grid).is_empty());
    }

    #[test]
    fn test_two_runs_in_one_line() {
        let grid = grid_from_rows(&["AAABBB"]);
        let runs = find_runs(&grid);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].start, Position::new(0, 0));
        assert_eq!(runs[1].start, Position::new(3, 0));
    }

    #[test]
    fn test_completes_run() {
        let mut grid = grid_from_rows(&["AA.BB", "CDECD", "CDDCD"]);
        grid.take(Position::new(2, 0));
        let a = PieceKind::new(0);
        let b = PieceKind::new(1);
        let c = PieceKind::new(2);
        let e = PieceKind::new(4);

        assert!(completes_run(&grid, Position::new(2, 0), a));
        assert!(completes_run(&grid, Position::new(2, 0), b));
        assert!(!completes_run(&grid, Position::new(2, 0), c));
        // Vertical: only the E at (2, 1) continues below, giving a pair.
        assert!(!completes_run(&grid, Position::new(2, 0), e));

        // Sandwich between two singles
        let grid = grid_from_rows(&["ACA"]);
        assert!(completes_run(&grid, Position::new(1, 0), a));
    }
}
