//! Headless driver: plays one session with seeded random input, then records
//! the final score on the leaderboard.

use anyhow::Context;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tetris_engine::{Action, Game, Leaderboard, Settings};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Seed for both the piece sequence and the simulated input
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many frames
    #[arg(long, default_value_t = 100_000)]
    max_ticks: u64,

    /// Chance of an input on any frame
    #[arg(long, default_value_t = 0.2)]
    input_rate: f64,

    /// Leaderboard file (defaults to the platform data directory)
    #[arg(long)]
    leaderboard: Option<PathBuf>,

    /// Do not record the score
    #[arg(long)]
    no_save: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Print the final board
    #[arg(long)]
    show_board: bool,

    /// Pace frames at the configured target fps instead of running flat out
    #[arg(long)]
    realtime: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    /// Game time the ticks represent at the configured frame rate
    game_seconds: f64,
    finished: bool,
    score: u32,
    level: u32,
    lines: u32,
    /// 1-based leaderboard position, if the score made the list
    rank: Option<usize>,
}

/// Get the temp directory for logs, creating it if needed
fn log_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("tetris-engine");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn random_action(rng: &mut ChaCha8Rng) -> Action {
    match rng.gen_range(0..10) {
        0..=2 => Action::MoveLeft,
        3..=5 => Action::MoveRight,
        6 | 7 => Action::Rotate,
        8 => Action::SoftDrop,
        _ => Action::HardDrop,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let dir = log_dir();
    let log_file = format!("{:016x}.log", seed);
    let file_appender = tracing_appender::rolling::never(&dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tetris_engine=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!("Session starting, seed={:016x}, log={}", seed, dir.join(&log_file).display());

    let settings = Settings::load();
    let mut game = Game::with_seed(settings.rules.clone(), settings.timing.clone(), seed);
    let mut input_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
    let input_rate = args.input_rate.clamp(0.0, 1.0);
    let frame_duration = settings.timing.frame_duration();

    let mut ticks = 0;
    while !game.is_game_over() && ticks < args.max_ticks {
        let frame_start = Instant::now();
        if input_rng.gen_bool(input_rate) {
            game.process_action(random_action(&mut input_rng));
        }
        game.tick();
        ticks += 1;

        if args.realtime {
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            }
        }
    }

    let finished = game.is_game_over();
    if !finished {
        tracing::info!("Stopped after {} ticks without a game over", ticks);
    }

    let mut rank = None;
    if finished && !args.no_save {
        let path = args
            .leaderboard
            .clone()
            .or_else(|| settings.leaderboard_path())
            .context("Could not determine leaderboard path")?;
        let mut leaderboard = Leaderboard::load(&path, settings.leaderboard.max_entries)
            .with_context(|| format!("Failed to read leaderboard {}", path.display()))?;
        rank = leaderboard.insert(game.score.points).map(|r| r + 1);
        leaderboard
            .save(&path)
            .with_context(|| format!("Failed to write leaderboard {}", path.display()))?;
        tracing::info!("Recorded score {} at rank {:?}", game.score.points, rank);
    }

    // writes defaults on first run so the file can be edited
    if let Err(e) = settings.save() {
        tracing::warn!("Could not save settings: {}", e);
    }

    let summary = Summary {
        seed,
        ticks,
        game_seconds: settings.timing.elapsed(ticks).as_secs_f64(),
        finished,
        score: game.score.points,
        level: game.score.level,
        lines: game.score.lines,
        rank,
    };

    if args.show_board {
        print!("{}", game.engine.snapshot());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Seed: {:016x}", summary.seed);
        println!("Final Score: {}", summary.score);
        println!("Level: {} | Lines: {}", summary.level, summary.lines);
        println!("Game time: {:.1}s over {} frames", summary.game_seconds, summary.ticks);
        match summary.rank {
            Some(rank) => println!("Leaderboard rank: #{}", rank),
            None if finished && !args.no_save => println!("Did not make the leaderboard"),
            None => {}
        }
    }

    Ok(())
}
