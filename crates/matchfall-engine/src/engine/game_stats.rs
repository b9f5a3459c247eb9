use serde::{Deserialize, Serialize};

use crate::core::piece::PieceKind;

use super::changeset::ResolveResult;

/// Statistics accumulated over the moves of a [`GameSession`](super::GameSession).
///
/// - **Moves used**: swaps that consumed a move under the session's [`MovePolicy`](super::MovePolicy)
/// - **Attempts**: every swap that passed the boundary checks
/// - **Rejected swaps**: attempts that formed no match
/// - **Removals**: per-kind and total pieces removed
/// - **Cascade distribution**: how many committed moves settled after N rounds
///
/// # Example
///
/// ```
/// use matchfall_engine::GameStats;
///
/// let stats = GameStats::new(5);
/// assert_eq!(stats.moves_used(), 0);
/// assert_eq!(stats.removed_by_kind(), &[0; 5]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    moves_used: usize,
    attempts: usize,
    rejected_swaps: usize,
    removed_by_kind: Vec<usize>,
    total_removed: usize,
    max_cascade_rounds: usize,
    cascade_counter: Vec<usize>,
}

impl GameStats {
    #[must_use]
    pub fn new(num_kinds: u8) -> Self {
        Self {
            removed_by_kind: vec![0; usize::from(num_kinds)],
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn moves_used(&self) -> usize {
        self.moves_used
    }

    #[must_use]
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    #[must_use]
    pub const fn rejected_swaps(&self) -> usize {
        self.rejected_swaps
    }

    /// Removal totals indexed by [`PieceKind::index`].
    #[must_use]
    pub fn removed_by_kind(&self) -> &[usize] {
        &self.removed_by_kind
    }

    #[must_use]
    pub fn removed_count(&self, kind: PieceKind) -> usize {
        self.removed_by_kind.get(kind.index()).copied().unwrap_or(0)
    }

    #[must_use]
    pub const fn total_removed(&self) -> usize {
        self.total_removed
    }

    /// The longest cascade seen so far, in rounds.
    #[must_use]
    pub const fn max_cascade_rounds(&self) -> usize {
        self.max_cascade_rounds
    }

    /// Histogram of committed moves by cascade length.
    ///
    /// Index `n` counts the moves that settled after `n` rounds. Index 0 is
    /// always zero since a committed move has at least one round.
    #[must_use]
    pub fn cascade_counter(&self) -> &[usize] {
        &self.cascade_counter
    }

    /// Records one attempted swap and its outcome.
    pub(crate) fn record(&mut self, result: &ResolveResult, move_consumed: bool) {
        self.attempts += 1;
        if move_consumed {
            self.moves_used += 1;
        }
        if result.is_empty() {
            self.rejected_swaps += 1;
            return;
        }

        for (kind, count) in result.removed_by_kind() {
            let index = kind.index();
            if self.removed_by_kind.len() <= index {
                self.removed_by_kind.resize(index + 1, 0);
            }
            self.removed_by_kind[index] += count;
        }
        self.total_removed += result.total_removed();

        let rounds = result.rounds();
        self.max_cascade_rounds = self.max_cascade_rounds.max(rounds);
        if self.cascade_counter.len() <= rounds {
            self.cascade_counter.resize(rounds + 1, 0);
        }
        self.cascade_counter[rounds] += 1;
    }
}
