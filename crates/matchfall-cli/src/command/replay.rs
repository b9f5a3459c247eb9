use std::path::PathBuf;

use anyhow::{Context as _, ensure};
use matchfall_engine::{GameStats, Piece, Position, ResolveResult, Seed};
use serde::Serialize;

use crate::{
    model::{game::Game, level::LevelStatus},
    schema::record::RecordedSession,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArg {
    /// Path to the recording file (JSON format)
    recording_file: PathBuf,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
struct PlacedPiece {
    position: Position,
    piece: Piece,
}

#[derive(Debug, Clone, Serialize)]
struct ReplayedMove {
    turn: usize,
    a: Position,
    b: Position,
    move_consumed: bool,
    result: ResolveResult,
}

/// Everything a presentation layer needs to animate a recorded game.
#[derive(Debug, Clone, Serialize)]
struct ReplayReport {
    seed: Seed,
    initial_pieces: Vec<PlacedPiece>,
    moves: Vec<ReplayedMove>,
    final_stats: GameStats,
    final_status: LevelStatus,
}

pub fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        recording_file,
        output,
    } = arg;

    eprintln!("Loading recording from {}", recording_file.display());
    let recording = util::read_recording_file(recording_file)?;
    eprintln!("Loaded {} swaps", recording.swaps.len());

    let report = replay(&recording)?;
    eprintln!(
        "Replay matches the recording: {} after {} moves",
        report.final_status,
        report.final_stats.moves_used()
    );
    Output::save_json(&report, output.clone())
}

/// Re-runs a recording and checks that it ends the way it was recorded.
fn replay(recording: &RecordedSession) -> anyhow::Result<ReplayReport> {
    recording.level.validate()?;
    let mut game = Game::new(recording.level.clone(), recording.seed)?;
    let initial_pieces = game
        .board()
        .pieces()
        .map(|(position, piece)| PlacedPiece { position, piece })
        .collect();

    let mut moves = Vec::with_capacity(recording.swaps.len());
    for (turn, swap) in recording.swaps.iter().enumerate() {
        ensure!(
            game.status().is_playing(),
            "recording continues after the level was {} at turn {turn}",
            game.status()
        );
        let outcome = game
            .try_swap(swap.a, swap.b)
            .with_context(|| format!("Failed to replay turn {turn}"))?;
        moves.push(ReplayedMove {
            turn,
            a: swap.a,
            b: swap.b,
            move_consumed: outcome.move_consumed,
            result: outcome.result,
        });
    }

    ensure!(
        game.stats() == &recording.final_stats,
        "replayed statistics differ from the recording"
    );
    ensure!(
        game.status() == recording.final_status,
        "replay ended {} but the recording ended {}",
        game.status(),
        recording.final_status
    );

    Ok(ReplayReport {
        seed: recording.seed,
        initial_pieces,
        moves,
        final_stats: game.stats().clone(),
        final_status: game.status(),
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::model::{bot::Bot, level::Level};

    fn recorded_game() -> RecordedSession {
        let mut game = Game::new(Level::default(), Seed::from(11)).unwrap();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..5 {
            let Some((a, b)) = Bot::Random.choose_swap(&game, &mut rng) else {
                break;
            };
            game.try_swap(a, b).unwrap();
        }
        game.into_recording()
    }

    #[test]
    fn test_replay_reproduces_recording() {
        let recording = recorded_game();
        let report = replay(&recording).unwrap();
        assert_eq!(report.moves.len(), recording.swaps.len());
        assert_eq!(report.final_stats, recording.final_stats);
        assert_eq!(report.initial_pieces.len(), 64);
        assert!(report.moves.iter().all(|m| !m.result.is_empty()));
    }

    #[test]
    fn test_recording_survives_json() {
        let recording = recorded_game();
        let json = serde_json::to_string(&recording).unwrap();
        let parsed: RecordedSession = serde_json::from_str(&json).unwrap();
        assert!(replay(&parsed).is_ok());
    }

    #[test]
    fn test_tampered_recording_is_detected() {
        let mut recording = recorded_game();
        let extra = recording.swaps[0];
        recording.swaps.push(extra);
        assert!(replay(&recording).is_err());
    }
}
