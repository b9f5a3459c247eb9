use std::{fs, path::Path};

use anyhow::Context as _;
use chrono::Utc;
use matchfall_engine::{Board, BoardError, GameSession, GameStats, MoveOutcome, Position, Seed};
use tracing::info;

use crate::{
    model::level::{Level, LevelProgress, LevelStatus},
    schema::record::{RecordedSession, SwapRecord},
    util::Output,
};

/// A level being played: the engine session plus objectives and a swap log.
#[derive(Debug)]
pub struct Game {
    level: Level,
    seed: Seed,
    session: GameSession,
    progress: LevelProgress,
    swaps: Vec<SwapRecord>,
}

impl Game {
    pub fn new(level: Level, seed: Seed) -> anyhow::Result<Self> {
        let board = level.build_board(seed)?;
        let session = GameSession::new(board, level.move_policy);
        let progress = LevelProgress::new(&level);
        Ok(Self {
            level,
            seed,
            session,
            progress,
            swaps: vec![],
        })
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub fn board(&self) -> &Board {
        self.session.board()
    }

    pub fn stats(&self) -> &GameStats {
        self.session.stats()
    }

    pub fn progress(&self) -> &LevelProgress {
        &self.progress
    }

    pub fn status(&self) -> LevelStatus {
        self.progress.status()
    }

    /// Returns `true` when no swap on the board can form a match.
    pub fn is_deadlocked(&self) -> bool {
        !self.board().has_valid_swap()
    }

    /// Plays one swap and updates the level progress.
    ///
    /// Only swaps that pass the board's checks are logged for replay.
    pub fn try_swap(&mut self, a: Position, b: Position) -> Result<MoveOutcome, BoardError> {
        let outcome = self.session.try_swap(a, b)?;
        self.swaps.push(SwapRecord { a, b });
        let status = self
            .progress
            .apply(outcome.result.removed_by_kind(), outcome.move_consumed);
        if !status.is_playing() {
            info!(%status, moves_used = self.progress.moves_used(), "level finished");
        }
        Ok(outcome)
    }

    pub fn into_recording(self) -> RecordedSession {
        RecordedSession {
            recorded_at: Utc::now(),
            seed: self.seed,
            final_stats: self.session.stats().clone(),
            final_status: self.progress.status(),
            level: self.level,
            swaps: self.swaps,
        }
    }

    /// Saves the recording as `{prefix}_{YYYYMMDD_HHMMSS}.json` under `record_dir`.
    pub fn save_recording(self, prefix: &str, record_dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(record_dir)
            .with_context(|| format!("Failed to create directory {}", record_dir.display()))?;
        let recording = self.into_recording();
        let filename = format!(
            "{prefix}_{}.json",
            recording.recorded_at.format("%Y%m%d_%H%M%S")
        );
        let path = record_dir.join(filename);
        Output::save_json(&recording, Some(path.clone()))?;
        eprintln!("Recording saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use matchfall_engine::GridError;

    use super::*;

    fn single_row_level(objectives: Vec<usize>) -> Level {
        serde_json::from_value(serde_json::json!({
            "board": { "width": 5, "height": 1, "num_kinds": 3 },
            "layout": ["AABAA"],
            "move_limit": 2,
            "objectives": objectives,
        }))
        .unwrap()
    }

    #[test]
    fn test_clearing_move_wins() {
        let mut game = Game::new(single_row_level(vec![3]), Seed::from(5)).unwrap();
        let outcome = game
            .try_swap(Position::new(2, 0), Position::new(1, 0))
            .unwrap();
        assert!(outcome.move_consumed);
        assert_eq!(game.status(), LevelStatus::Won);
        assert_eq!(game.progress().moves_left(), 1);
    }

    #[test]
    fn test_rejected_requests_are_not_logged() {
        let mut game = Game::new(single_row_level(vec![3]), Seed::from(5)).unwrap();
        let err = game
            .try_swap(Position::new(0, 0), Position::new(2, 0))
            .unwrap_err();
        assert!(matches!(err, BoardError::Grid(GridError::NotAdjacent { .. })));

        // Swapping two A's forms no match but reaches the rules.
        let outcome = game
            .try_swap(Position::new(0, 0), Position::new(1, 0))
            .unwrap();
        assert!(!outcome.move_consumed);

        let recording = game.into_recording();
        assert_eq!(
            recording.swaps,
            [SwapRecord {
                a: Position::new(0, 0),
                b: Position::new(1, 0)
            }]
        );
        assert_eq!(recording.final_stats.attempts(), 1);
        assert_eq!(recording.final_status, LevelStatus::Playing);
    }
}
