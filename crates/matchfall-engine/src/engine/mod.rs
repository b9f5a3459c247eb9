//! Board resolution and game bookkeeping.
//!
//! This module builds the rules on top of the [`core`](crate::core) data
//! structures:
//!
//! - [`Board`] - The grid, its piece factory, and the resolve cycle
//! - [`ResolveResult`] - Ordered changeset produced by one resolve
//! - [`PieceFactory`] - Identity allocation and seeded kind choice
//! - [`EventPublisher`] - Removal and turn notifications for a single listener
//! - [`GameSession`] - Move accounting and [`GameStats`] over a board
//!
//! # Turn Flow
//!
//! 1. Validate a [`BoardConfig`] and fill a stable board
//! 2. The player picks two adjacent cells
//! 3. [`Board::resolve`] either reverts the swap or commits a full cascade
//! 4. Presentation replays the changeset; game rules consume the removals
//!
//! # Example
//!
//! ```
//! use matchfall_engine::{Board, BoardConfig, GameSession, MovePolicy, Seed};
//!
//! let board = Board::with_seed(BoardConfig::default(), Seed::from(7)).unwrap();
//! let mut session = GameSession::new(board, MovePolicy::default());
//!
//! let (a, b) = session.board().valid_swaps()[0];
//! let outcome = session.try_swap(a, b).unwrap();
//!
//! assert!(outcome.move_consumed);
//! assert_eq!(session.stats().moves_used(), 1);
//! ```

pub use self::{
    board::*, changeset::*, config::*, events::*, game_stats::*, piece_factory::*, session::*,
};

mod board;
mod changeset;
mod config;
mod events;
mod game_stats;
mod piece_factory;
mod session;
