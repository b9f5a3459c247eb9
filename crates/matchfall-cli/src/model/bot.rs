use matchfall_engine::{Position, matcher};
use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::model::game::Game;

/// Swap selection strategies for headless play.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Bot {
    /// Any swap that forms a match, uniformly
    #[default]
    Random,
    /// The swap whose immediate match scores best against the objectives
    Greedy,
}

impl Bot {
    /// Picks the next swap, or `None` if the board is deadlocked.
    pub fn choose_swap<R>(self, game: &Game, rng: &mut R) -> Option<(Position, Position)>
    where
        R: Rng + ?Sized,
    {
        let swaps = game.board().valid_swaps();
        match self {
            Bot::Random => swaps.choose(rng).copied(),
            Bot::Greedy => swaps
                .into_iter()
                .map(|swap| (immediate_score(game, swap), swap))
                .max_by_key(|(score, _)| *score)
                .map(|(_, swap)| swap),
        }
    }
}

/// Scores the first cascade round of a swap: pieces that still count toward
/// an objective are worth two points, any other removal one.
fn immediate_score(game: &Game, (a, b): (Position, Position)) -> usize {
    let mut grid = game.board().grid().clone();
    if grid.swap(a, b).is_err() {
        return 0;
    }
    let remaining = game.progress().remaining();
    matcher::find_matches(&grid)
        .into_iter()
        .filter_map(|pos| grid.kind_at(pos))
        .map(|kind| {
            if remaining.get(kind.index()).is_some_and(|&n| n > 0) {
                2
            } else {
                1
            }
        })
        .sum()
}
