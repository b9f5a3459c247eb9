use std::path::PathBuf;

use matchfall_engine::{BoardError, Seed};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    model::{bot::Bot, game::Game, level::LevelStatus},
    util::{self, Output},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Level file (JSON); a built-in level is used when omitted
    #[arg(long)]
    level: Option<PathBuf>,
    /// Number of sessions to play
    #[arg(long, default_value_t = 100)]
    sessions: usize,
    /// Swap selection strategy
    #[arg(long, value_enum, default_value_t = Bot::Random)]
    bot: Bot,
    /// Seed for the per-session seeds; random when omitted
    #[arg(long)]
    seed: Option<Seed>,
    /// Save every session as a recording into this directory
    #[arg(long)]
    record_dir: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "kebab-case")]
enum SessionEnd {
    Won,
    Lost,
    /// No swap could form a match
    Deadlocked,
    /// A swap hit the cascade limit; the board could not progress
    CascadeLimit,
}

#[derive(Debug, Clone, Serialize)]
struct SessionResult {
    seed: Seed,
    end: SessionEnd,
    moves_used: usize,
    total_removed: usize,
    max_cascade_rounds: usize,
}

#[derive(Debug, Clone, Serialize)]
struct SimulationSummary {
    bot: Bot,
    sessions: usize,
    won: usize,
    lost: usize,
    deadlocked: usize,
    cascade_limit: usize,
    win_rate: f64,
    mean_moves_used: f64,
    mean_removed: f64,
    max_cascade_rounds: usize,
    /// Committed moves by cascade length, summed over all sessions
    cascade_counter: Vec<usize>,
    results: Vec<SessionResult>,
}

impl SimulationSummary {
    fn new(bot: Bot, results: Vec<SessionResult>, cascade_counter: Vec<usize>) -> Self {
        let count = |end: SessionEnd| results.iter().filter(|r| r.end == end).count();
        #[expect(clippy::cast_precision_loss)]
        let mean = |value: fn(&SessionResult) -> usize| {
            if results.is_empty() {
                0.0
            } else {
                results.iter().map(value).sum::<usize>() as f64 / results.len() as f64
            }
        };
        #[expect(clippy::cast_precision_loss)]
        let win_rate = if results.is_empty() {
            0.0
        } else {
            count(SessionEnd::Won) as f64 / results.len() as f64
        };

        Self {
            bot,
            sessions: results.len(),
            won: count(SessionEnd::Won),
            lost: count(SessionEnd::Lost),
            deadlocked: count(SessionEnd::Deadlocked),
            cascade_limit: count(SessionEnd::CascadeLimit),
            win_rate,
            mean_moves_used: mean(|r| r.moves_used),
            mean_removed: mean(|r| r.total_removed),
            max_cascade_rounds: results
                .iter()
                .map(|r| r.max_cascade_rounds)
                .max()
                .unwrap_or(0),
            cascade_counter,
            results,
        }
    }
}

pub(crate) fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        level,
        sessions,
        bot,
        seed,
        record_dir,
        output,
    } = arg;

    let level = util::read_level_file(level.as_ref())?;
    let master_seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut seeds = Pcg32::from_seed(master_seed.to_bytes());
    let mut bot_rng = Pcg32::seed_from_u64(seeds.random());

    eprintln!("Simulating {sessions} sessions with the {bot:?} bot (seed {master_seed})...");
    let mut results = Vec::with_capacity(*sessions);
    let mut cascade_counter = vec![];
    for i in 0..*sessions {
        let session_seed: Seed = seeds.random();
        let mut game = Game::new(level.clone(), session_seed)?;
        let end = play_session(&mut game, *bot, &mut bot_rng)?;
        debug!(session = i, ?end, moves_used = game.stats().moves_used(), "session finished");

        let stats = game.stats();
        for (rounds, count) in stats.cascade_counter().iter().enumerate() {
            if cascade_counter.len() <= rounds {
                cascade_counter.resize(rounds + 1, 0);
            }
            cascade_counter[rounds] += count;
        }
        results.push(SessionResult {
            seed: session_seed,
            end,
            moves_used: stats.moves_used(),
            total_removed: stats.total_removed(),
            max_cascade_rounds: stats.max_cascade_rounds(),
        });

        if let Some(record_dir) = record_dir {
            game.save_recording(&format!("bot_{i:04}"), record_dir)?;
        }
    }

    let summary = SimulationSummary::new(*bot, results, cascade_counter);
    eprintln!(
        "Won {} / {} sessions ({:.1}%)",
        summary.won,
        summary.sessions,
        summary.win_rate * 100.0
    );
    Output::save_json(&summary, output.clone())
}

fn play_session(game: &mut Game, bot: Bot, rng: &mut Pcg32) -> anyhow::Result<SessionEnd> {
    loop {
        match game.status() {
            LevelStatus::Won => return Ok(SessionEnd::Won),
            LevelStatus::Lost => return Ok(SessionEnd::Lost),
            LevelStatus::Playing => {}
        }
        let Some((a, b)) = bot.choose_swap(game, rng) else {
            return Ok(SessionEnd::Deadlocked);
        };
        match game.try_swap(a, b) {
            Ok(_) => {}
            Err(err @ BoardError::CascadeLimit { .. }) => {
                warn!(%err, seed = %game.seed(), "session aborted");
                return Ok(SessionEnd::CascadeLimit);
            }
            Err(err) => return Err(err.into()),
        }
    }
}
