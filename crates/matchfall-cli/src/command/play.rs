use std::{
    io::{self, BufRead as _, Write},
    path::PathBuf,
};

use anyhow::Context as _;
use matchfall_engine::{BoardError, Position, ResolveResult, Seed};
use rand::Rng as _;

use crate::{
    model::{game::Game, level::LevelStatus},
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Level file (JSON); a built-in level is used when omitted
    #[clap(long)]
    level: Option<PathBuf>,
    /// Seed as 32 hex characters; random when omitted
    #[clap(long)]
    seed: Option<Seed>,
    /// Save the game recording to a file when the session ends
    #[clap(long)]
    save_recording: bool,
    /// Directory to save recording files
    #[clap(long, default_value = "./data/recordings/")]
    record_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Swap(Position, Position),
    Hint,
    Quit,
    Empty,
    Invalid,
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => return Input::Empty,
            "hint" | "h" => return Input::Hint,
            "quit" | "q" => return Input::Quit,
            _ => {}
        }
        let Ok(coords) = line
            .split_whitespace()
            .map(str::parse::<i32>)
            .collect::<Result<Vec<_>, _>>()
        else {
            return Input::Invalid;
        };
        match coords[..] {
            [x1, y1, x2, y2] => Input::Swap(Position::new(x1, y1), Position::new(x2, y2)),
            _ => Input::Invalid,
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        level,
        seed,
        save_recording,
        record_dir,
    } = arg;

    let level = util::read_level_file(level.as_ref())?;
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut game = Game::new(level, seed)?;

    let mut out = io::stdout().lock();
    writeln!(out, "Seed: {seed}")?;
    writeln!(out, "Enter swaps as `x1 y1 x2 y2`, `hint` for a suggestion, `quit` to stop.")?;
    print_board(&mut out, &game)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read input")?;
        match Input::parse(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Invalid => writeln!(out, "Expected four integers: x1 y1 x2 y2")?,
            Input::Hint => match game.board().valid_swaps().first() {
                Some((a, b)) => writeln!(out, "Try swapping {a} and {b}")?,
                None => writeln!(out, "No swap can form a match")?,
            },
            Input::Swap(a, b) => match game.try_swap(a, b) {
                Ok(outcome) => {
                    print_result(&mut out, &outcome.result)?;
                    print_board(&mut out, &game)?;
                }
                Err(err @ BoardError::Grid(_)) => writeln!(out, "Rejected: {err}")?,
                Err(err @ BoardError::CascadeLimit { .. }) => {
                    writeln!(out, "Swap aborted: {err}")?;
                }
            },
        }

        if game.status() != LevelStatus::Playing {
            break;
        }
        if game.is_deadlocked() {
            writeln!(out, "No valid swaps left.")?;
            break;
        }
    }

    match game.status() {
        LevelStatus::Won => writeln!(out, "Level cleared!")?,
        LevelStatus::Lost => writeln!(out, "Out of moves.")?,
        LevelStatus::Playing => {}
    }
    out.flush()?;
    drop(out);

    if *save_recording {
        game.save_recording("manual", record_dir)?;
    }
    Ok(())
}

fn print_board<W>(out: &mut W, game: &Game) -> io::Result<()>
where
    W: Write,
{
    let grid = game.board().grid();
    write!(out, "   ")?;
    for x in 0..grid.width() {
        write!(out, "{}", x % 10)?;
    }
    writeln!(out)?;
    for (y, row) in grid.to_string().lines().enumerate() {
        writeln!(out, "{y:>2} {row}")?;
    }
    writeln!(out, "{}", game.progress())
}

fn print_result<W>(out: &mut W, result: &ResolveResult) -> io::Result<()>
where
    W: Write,
{
    if result.is_empty() {
        return writeln!(out, "No match, swap reverted.");
    }
    write!(out, "Removed {} in {} round(s):", result.total_removed(), result.rounds())?;
    for (kind, count) in result.removed_by_kind() {
        write!(out, " {}x{count}", kind.as_char())?;
    }
    writeln!(out)
}
