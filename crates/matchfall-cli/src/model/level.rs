use std::fmt;

use anyhow::{Context as _, ensure};
use matchfall_engine::{Board, BoardConfig, MovePolicy, PieceKind, SeededKinds, Seed};
use serde::{Deserialize, Serialize};

/// A playable level: board shape, optional fixed layout, move budget, and
/// per-kind removal objectives.
///
/// `objectives[i]` is the number of pieces of the `i`-th kind (`'A'` + `i`)
/// the player has to remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<String>>,
    pub move_limit: usize,
    pub objectives: Vec<usize>,
    #[serde(default)]
    pub move_policy: MovePolicy,
}

impl Default for Level {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            layout: None,
            move_limit: 20,
            objectives: vec![10, 10, 10],
            move_policy: MovePolicy::default(),
        }
    }
}

impl Level {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.board.validate().context("Invalid board configuration")?;
        ensure!(self.move_limit > 0, "move limit must be at least 1");
        ensure!(
            self.objectives.len() <= usize::from(self.board.num_kinds),
            "level has {} objectives but only {} piece kinds",
            self.objectives.len(),
            self.board.num_kinds
        );
        ensure!(
            self.objectives.iter().any(|&count| count > 0),
            "level needs at least one non-zero objective"
        );
        Ok(())
    }

    /// Builds the level's starting board. A fixed layout takes precedence
    /// over a random fill; the seed drives spawns in both cases.
    pub fn build_board(&self, seed: Seed) -> anyhow::Result<Board> {
        let board = match &self.layout {
            Some(rows) => Board::from_layout(self.board, rows, SeededKinds::new(seed)),
            None => Board::with_seed(self.board, seed),
        };
        board.context("Failed to build the level board")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display, derive_more::IsVariant)]
#[serde(rename_all = "kebab-case")]
pub enum LevelStatus {
    #[display("playing")]
    Playing,
    #[display("won")]
    Won,
    #[display("lost")]
    Lost,
}

/// Objective counters and the move budget of a level in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    remaining: Vec<usize>,
    move_limit: usize,
    moves_used: usize,
    status: LevelStatus,
}

impl LevelProgress {
    #[must_use]
    pub fn new(level: &Level) -> Self {
        Self {
            remaining: level.objectives.clone(),
            move_limit: level.move_limit,
            moves_used: 0,
            status: LevelStatus::Playing,
        }
    }

    #[must_use]
    pub fn status(&self) -> LevelStatus {
        self.status
    }

    #[must_use]
    pub fn remaining(&self) -> &[usize] {
        &self.remaining
    }

    #[must_use]
    pub fn moves_used(&self) -> usize {
        self.moves_used
    }

    #[must_use]
    pub fn moves_left(&self) -> usize {
        self.move_limit.saturating_sub(self.moves_used)
    }

    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.remaining.iter().all(|&count| count == 0)
    }

    /// Applies the removals of one move, then charges the move if needed.
    ///
    /// Objectives are checked before the budget, so clearing the level with
    /// the last move wins. Once the level is won or lost, further moves are
    /// ignored.
    pub fn apply<I>(&mut self, removed: I, move_consumed: bool) -> LevelStatus
    where
        I: IntoIterator<Item = (PieceKind, usize)>,
    {
        if !self.status.is_playing() {
            return self.status;
        }
        for (kind, count) in removed {
            if let Some(remaining) = self.remaining.get_mut(kind.index()) {
                *remaining = remaining.saturating_sub(count);
            }
        }
        if move_consumed {
            self.moves_used += 1;
        }

        if self.is_cleared() {
            self.status = LevelStatus::Won;
        } else if self.moves_left() == 0 {
            self.status = LevelStatus::Lost;
        }
        self.status
    }
}

impl fmt::Display for LevelProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Objectives:")?;
        for (kind, remaining) in PieceKind::all(PieceKind::MAX_KINDS).zip(&self.remaining) {
            write!(f, " {}:{remaining}", kind.as_char())?;
        }
        write!(
            f,
            " | Moves used: {} | Moves left: {}",
            self.moves_used,
            self.moves_left()
        )
    }
}
