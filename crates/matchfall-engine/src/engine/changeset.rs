use serde::{Deserialize, Serialize};

use crate::core::{
    piece::{Piece, PieceKind},
    position::Position,
};

/// What happened to one piece during a cascade round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Change {
    /// The piece was part of a match and left the board.
    Removed { at: Position },
    /// The piece fell toward the bottom edge.
    Fell { from: Position, to: Position },
    /// The piece was spawned. `from` is a virtual position above the board
    /// in the same column.
    Created { from: Position, to: Position },
}

impl Change {
    /// Position within a round: removals, then falls, then spawns.
    #[must_use]
    pub const fn phase(self) -> usize {
        match self {
            Change::Removed { .. } => 0,
            Change::Fell { .. } => 1,
            Change::Created { .. } => 2,
        }
    }
}

/// One entry of a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Cascade round the change belongs to, starting at 1.
    pub round: usize,
    pub piece: Piece,
    #[serde(flatten)]
    pub change: Change,
}

impl ChangeRecord {
    #[must_use]
    pub fn was_created(&self) -> bool {
        self.change.is_created()
    }

    /// Where the piece was before the change.
    #[must_use]
    pub fn origin(&self) -> Position {
        match self.change {
            Change::Removed { at } => at,
            Change::Fell { from, .. } | Change::Created { from, .. } => from,
        }
    }

    /// Where the piece is after the change, `None` for removals.
    #[must_use]
    pub fn destination(&self) -> Option<Position> {
        match self.change {
            Change::Removed { .. } => None,
            Change::Fell { to, .. } | Change::Created { to, .. } => Some(to),
        }
    }
}

/// Outcome of one [`Board::resolve`](crate::Board::resolve) call.
///
/// The changeset is ordered round by round, and within a round all removals
/// precede all falls, which precede all spawns. Presentation code can replay
/// it front to back.
///
/// An empty result means the swap was rejected by the rules: no match was
/// formed and the board is exactly as it was before the call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveResult {
    changes: Vec<ChangeRecord>,
    removed: Vec<usize>,
    rounds: usize,
}

impl ResolveResult {
    pub(crate) fn with_kinds(num_kinds: u8) -> Self {
        Self {
            changes: vec![],
            removed: vec![0; usize::from(num_kinds)],
            rounds: 0,
        }
    }

    pub(crate) fn begin_round(&mut self) -> usize {
        self.rounds += 1;
        self.rounds
    }

    pub(crate) fn push(&mut self, piece: Piece, change: Change) {
        if change.is_removed() {
            let index = piece.kind().index();
            if self.removed.len() <= index {
                self.removed.resize(index + 1, 0);
            }
            self.removed[index] += 1;
        }
        self.changes.push(ChangeRecord {
            round: self.rounds,
            piece,
            change,
        });
    }

    #[must_use]
    pub fn changes(&self) -> &[ChangeRecord] {
        &self.changes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns `true` if any piece was removed, i.e. the swap changed the board.
    #[must_use]
    pub fn is_move_used(&self) -> bool {
        self.total_removed() > 0
    }

    /// Number of cascade rounds, 0 for a rejected swap.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Returns the records of one round (1-based).
    #[must_use]
    pub fn round(&self, round: usize) -> &[ChangeRecord] {
        let start = self.changes.partition_point(|r| r.round < round);
        let end = self.changes.partition_point(|r| r.round <= round);
        &self.changes[start..end]
    }

    #[must_use]
    pub fn removed_count(&self, kind: PieceKind) -> usize {
        self.removed.get(kind.index()).copied().unwrap_or(0)
    }

    /// Per-kind removal totals for kinds with at least one removal.
    pub fn removed_by_kind(&self) -> impl Iterator<Item = (PieceKind, usize)> + '_ {
        self.removed
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .filter_map(|(i, count)| Some((PieceKind::try_new(u8::try_from(i).ok()?)?, *count)))
    }

    #[must_use]
    pub fn total_removed(&self) -> usize {
        self.removed.iter().sum()
    }

    /// Removal facts in changeset order: where each removed piece was.
    pub fn removals(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.changes.iter().filter_map(|record| match record.change {
            Change::Removed { at } => Some((at, record.piece)),
            _ => None,
        })
    }
}
