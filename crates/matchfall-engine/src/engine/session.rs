use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{BoardError, core::position::Position};

use super::{
    board::Board,
    changeset::ResolveResult,
    events::BoardEvent,
    game_stats::GameStats,
    piece_factory::{KindSource, SeededKinds},
};

/// When a swap attempt is charged against the move budget.
///
/// Out-of-bounds and non-adjacent requests are never charged: they are
/// rejected before the rules are consulted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(rename_all = "kebab-case")]
pub enum MovePolicy {
    /// Only swaps that changed the board consume a move.
    #[default]
    ChargeOnChange,
    /// Every rule-checked attempt consumes a move, including reverted swaps.
    ChargeEveryAttempt,
}

impl MovePolicy {
    #[must_use]
    pub fn charges(self, result: &ResolveResult) -> bool {
        match self {
            MovePolicy::ChargeOnChange => result.is_move_used(),
            MovePolicy::ChargeEveryAttempt => true,
        }
    }
}

/// Result of [`GameSession::try_swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub result: ResolveResult,
    pub move_consumed: bool,
}

/// A board plus the bookkeeping of the moves played on it.
#[derive(Debug)]
pub struct GameSession<S = SeededKinds> {
    board: Board<S>,
    policy: MovePolicy,
    stats: GameStats,
}

impl<S> GameSession<S>
where
    S: KindSource,
{
    #[must_use]
    pub fn new(board: Board<S>, policy: MovePolicy) -> Self {
        let stats = GameStats::new(board.num_kinds());
        Self {
            board,
            policy,
            stats,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    /// Connects the board's event listener. See [`Board::subscribe`].
    pub fn subscribe(&mut self) -> Receiver<BoardEvent> {
        self.board.subscribe()
    }

    #[must_use]
    pub fn policy(&self) -> MovePolicy {
        self.policy
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Resolves a swap and updates the statistics.
    ///
    /// Errors leave both the board and the statistics untouched.
    pub fn try_swap(&mut self, a: Position, b: Position) -> Result<MoveOutcome, BoardError> {
        let result = self.board.resolve(a, b)?;
        let move_consumed = self.policy.charges(&result);
        self.stats.record(&result, move_consumed);
        debug!(
            moves_used = self.stats.moves_used(),
            move_consumed,
            removed = result.total_removed(),
            "move played"
        );
        Ok(MoveOutcome {
            result,
            move_consumed,
        })
    }
}
