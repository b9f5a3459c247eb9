use std::{collections::BTreeSet, sync::mpsc::Receiver};

use rand::Rng as _;
use tracing::{debug, instrument, trace, warn};

use crate::{
    BoardError, ConfigError,
    core::{
        grid::Grid,
        matcher,
        piece::{Piece, PieceKind},
        position::Position,
    },
};

use super::{
    changeset::{Change, ResolveResult},
    config::BoardConfig,
    events::{BoardEvent, EventPublisher},
    piece_factory::{KindSource, PieceFactory, SeededKinds, Seed, SpawnPolicy},
};

/// The board-resolution engine: a grid plus the rules that change it.
///
/// A board is always *stable* between calls: every cell holds a piece and no
/// run of three or more same-kind pieces exists. [`resolve`](Self::resolve)
/// is the only operation that changes it.
///
/// # Resolve cycle
///
/// 1. Swap the two cells on a working copy of the grid
/// 2. If no match formed, discard the copy and return an empty result
/// 3. Remove every matched piece
/// 4. Let the remaining pieces fall to the bottom of their columns
/// 5. Spawn new pieces into the empty cells at the top
/// 6. Repeat from 3 while matches exist, then commit the copy
///
/// # Example
///
/// ```
/// use matchfall_engine::{Board, BoardConfig, Seed};
///
/// let mut board = Board::with_seed(BoardConfig::default(), Seed::from(1)).unwrap();
/// let (a, b) = board.valid_swaps()[0];
///
/// let result = board.resolve(a, b).unwrap();
/// assert!(result.is_move_used());
/// assert!(board.grid().is_full());
/// ```
#[derive(Debug)]
pub struct Board<S = SeededKinds> {
    config: BoardConfig,
    grid: Grid,
    scratch: Grid,
    factory: PieceFactory<S>,
    events: EventPublisher,
}

impl Board<SeededKinds> {
    /// Creates a randomly filled board with a random seed.
    pub fn new(config: BoardConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but reproducible from `seed`.
    pub fn with_seed(config: BoardConfig, seed: Seed) -> Result<Self, ConfigError> {
        Self::with_source(config, SeededKinds::new(seed))
    }
}

impl<S> Board<S>
where
    S: KindSource,
{
    /// Creates a randomly filled board drawing kinds from `source`.
    ///
    /// Cells are filled in row-major order, so only the left and upper
    /// neighbours are occupied when a kind is chosen. That excludes at most
    /// two kinds, and with at least three kinds the result is always stable.
    pub fn with_source(config: BoardConfig, source: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut factory = PieceFactory::new(config.num_kinds, config.spawn_policy, source);
        let mut grid = Grid::new(config.width, config.height);
        let positions = grid.cells().map(|(pos, _)| pos).collect::<Vec<_>>();
        for pos in positions {
            let piece = factory.spawn_with_policy(&grid, pos, SpawnPolicy::AvoidMatches);
            grid.place(pos, piece);
        }
        Ok(Self::from_parts(config, grid, factory))
    }

    /// Creates a board from rows of kind characters (`'A'`, `'B'`, ...).
    ///
    /// The layout must match the configured dimensions, use only configured
    /// kinds, and contain no match.
    pub fn from_layout<R>(config: BoardConfig, rows: &[R], source: S) -> Result<Self, ConfigError>
    where
        R: AsRef<str>,
    {
        config.validate()?;
        if rows.len() != config.height {
            return Err(ConfigError::LayoutHeight {
                expected: config.height,
                actual: rows.len(),
            });
        }
        for (row, cells) in rows.iter().enumerate() {
            let actual = cells.as_ref().chars().count();
            if actual != config.width {
                return Err(ConfigError::LayoutWidth {
                    row,
                    expected: config.width,
                    actual,
                });
            }
        }

        let mut factory = PieceFactory::new(config.num_kinds, config.spawn_policy, source);
        let mut grid = Grid::new(config.width, config.height);
        let positions = grid.cells().map(|(pos, _)| pos).collect::<Vec<_>>();
        let symbols = rows.iter().flat_map(|row| row.as_ref().chars());
        for (pos, symbol) in positions.into_iter().zip(symbols) {
            let kind = PieceKind::from_char(symbol)
                .filter(|kind| kind.index() < usize::from(config.num_kinds))
                .ok_or(ConfigError::UnknownKind {
                    symbol,
                    position: pos,
                })?;
            grid.place(pos, factory.create(kind));
        }

        if let Some(&position) = matcher::find_matches(&grid).first() {
            return Err(ConfigError::UnstableLayout { position });
        }
        Ok(Self::from_parts(config, grid, factory))
    }

    fn from_parts(config: BoardConfig, grid: Grid, factory: PieceFactory<S>) -> Self {
        let scratch = grid.clone();
        Self {
            config,
            grid,
            scratch,
            factory,
            events: EventPublisher::default(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    #[must_use]
    pub fn num_kinds(&self) -> u8 {
        self.config.num_kinds
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn is_within_bounds(&self, x: i32, y: i32) -> bool {
        self.grid.is_within_bounds(x, y)
    }

    /// Enumerates all pieces in row-major order, for building an initial mirror.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.grid.pieces()
    }

    /// Connects the board's single event listener, replacing any previous one.
    pub fn subscribe(&mut self) -> Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Attempts to swap two adjacent cells and resolves every resulting cascade.
    ///
    /// # Returns
    ///
    /// - `Ok` with an empty result if the swap formed no match; the board is unchanged
    /// - `Ok` with the ordered changeset if the swap was committed
    ///
    /// # Errors
    ///
    /// - [`BoardError::Grid`] if a position is outside the grid or the cells are
    ///   not adjacent
    /// - [`BoardError::CascadeLimit`] if the cascade did not settle within
    ///   [`BoardConfig::max_cascade_rounds`]
    ///
    /// The board is unchanged whenever an error is returned, including the
    /// state of its piece factory, so retrying a swap gives the same outcome.
    #[instrument(level = "debug", skip(self))]
    pub fn resolve(&mut self, a: Position, b: Position) -> Result<ResolveResult, BoardError> {
        self.scratch.clone_from(&self.grid);
        self.scratch.swap(a, b)?;

        let mut matched = matcher::find_matches(&self.scratch);
        if matched.is_empty() {
            debug!("swap formed no match");
            self.events.stage(BoardEvent::SwapRejected { a, b });
            self.events.flush();
            return Ok(ResolveResult::default());
        }

        // Spawns draw kinds and ids; an aborted call must not consume them.
        let checkpoint = self.factory.clone();
        let mut result = ResolveResult::with_kinds(self.config.num_kinds);
        while !matched.is_empty() {
            let round = result.begin_round();
            if round > self.config.max_cascade_rounds {
                warn!(
                    limit = self.config.max_cascade_rounds,
                    "cascade did not settle, discarding resolve"
                );
                self.events.discard();
                self.factory = checkpoint;
                return Err(BoardError::CascadeLimit {
                    limit: self.config.max_cascade_rounds,
                });
            }
            remove_matches(&mut self.scratch, &matched, &mut result, &mut self.events);
            apply_gravity(&mut self.scratch, &mut result);
            refill(&mut self.scratch, &mut self.factory, &mut result);
            debug!(round, removed = matched.len(), "cascade round settled");
            matched = matcher::find_matches(&self.scratch);
        }

        std::mem::swap(&mut self.grid, &mut self.scratch);
        self.events.stage(BoardEvent::TurnFinished {
            rounds: result.rounds(),
            removed: result.total_removed(),
        });
        self.events.flush();
        Ok(result)
    }

    /// Lists every adjacent pair whose swap would form a match.
    ///
    /// Each pair is reported once, as (left, right) or (upper, lower).
    #[must_use]
    pub fn valid_swaps(&self) -> Vec<(Position, Position)> {
        let mut grid = self.grid.clone();
        let mut swaps = vec![];
        for (pos, _) in self.grid.cells() {
            for other in [
                Position::new(pos.x() + 1, pos.y()),
                Position::new(pos.x(), pos.y() + 1),
            ] {
                if swap_forms_match(&mut grid, pos, other) {
                    swaps.push((pos, other));
                }
            }
        }
        swaps
    }

    /// Returns `false` if the board is deadlocked (no swap can match).
    #[must_use]
    pub fn has_valid_swap(&self) -> bool {
        !self.valid_swaps().is_empty()
    }
}

fn swap_forms_match(grid: &mut Grid, a: Position, b: Position) -> bool {
    if grid.swap(a, b).is_err() {
        return false;
    }
    let forms = [a, b].into_iter().any(|pos| {
        grid.kind_at(pos)
            .is_some_and(|kind| matcher::completes_run(grid, pos, kind))
    });
    // Swapping back cannot fail once the first swap succeeded.
    let _ = grid.swap(a, b);
    forms
}

fn remove_matches(
    grid: &mut Grid,
    matched: &BTreeSet<Position>,
    result: &mut ResolveResult,
    events: &mut EventPublisher,
) {
    for &pos in matched {
        let Some(piece) = grid.take(pos) else {
            continue;
        };
        trace!(%pos, kind = %piece.kind().as_char(), "piece removed");
        result.push(piece, Change::Removed { at: pos });
        events.stage(BoardEvent::PieceRemoved {
            position: pos,
            kind: piece.kind(),
            round: result.rounds(),
        });
    }
}

/// Compacts every column toward the bottom edge, keeping piece order.
fn apply_gravity(grid: &mut Grid, result: &mut ResolveResult) {
    for x in 0..grid.width() {
        let mut floor = grid.height();
        for y in (0..grid.height()).rev() {
            let from = grid.position(x, y);
            let Some(piece) = grid.take(from) else {
                continue;
            };
            floor -= 1;
            let to = grid.position(x, floor);
            grid.place(to, piece);
            if to != from {
                result.push(piece, Change::Fell { from, to });
            }
        }
    }
}

/// Spawns pieces into the empty cells left at the top of each column.
///
/// Each column is filled bottom-up. The pieces start stacked above the board
/// so that the lowest new piece enters first.
fn refill<S>(grid: &mut Grid, factory: &mut PieceFactory<S>, result: &mut ResolveResult)
where
    S: KindSource,
{
    for x in 0..grid.width() {
        let empty = grid.column(x).take_while(|(_, cell)| cell.is_none()).count();
        let drop_height = i32::try_from(empty).unwrap_or(i32::MAX);
        for y in (0..empty).rev() {
            let to = grid.position(x, y);
            let piece = factory.spawn_at(grid, to);
            grid.place(to, piece);
            result.push(
                piece,
                Change::Created {
                    from: to.above(drop_height),
                    to,
                },
            );
        }
    }
}
