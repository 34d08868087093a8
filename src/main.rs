//! Michi-Gomoku: a small Gomoku engine.
//!
//! ## Usage
//!
//! - `michi-gomoku` - Show a demo
//! - `michi-gomoku gtp` - Start GTP server for GUI integration
//! - `michi-gomoku demo` - Play a short self-play game
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (default `warn`), e.g. `RUST_LOG=michi_gomoku=debug`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use michi_gomoku::board::{Board, Color};
use michi_gomoku::constants::{DEFAULT_DEPTH, DEFAULT_SIZE, N_SIMS};
use michi_gomoku::gtp::{Engine, GtpEngine};
use michi_gomoku::rollout::{RolloutConfig, RolloutPlayer};
use michi_gomoku::search::{SearchConfig, SearchMode, Searcher};

/// Michi-Gomoku: Gomoku solver and rollout player
#[derive(Parser)]
#[command(name = "michi-gomoku")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp {
        /// Board size
        #[arg(long, default_value_t = DEFAULT_SIZE)]
        size: usize,

        /// Rollouts per candidate move
        #[arg(long, default_value_t = N_SIMS)]
        sims: usize,

        /// Search depth for `solve` and the search engine
        #[arg(long, default_value_t = DEFAULT_DEPTH)]
        depth: u32,

        /// Move generator for `genmove`: rollout or search
        #[arg(long, default_value = "rollout")]
        engine: Engine,

        /// Seed for reproducible rollouts
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play a short self-play game and print it
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Gtp {
            size,
            sims,
            depth,
            engine,
            seed,
        }) => {
            let board = Board::new(size)?;
            let search = SearchConfig {
                depth,
                ..SearchConfig::default()
            };
            let rollout = RolloutConfig {
                simulations: sims,
                seed,
                ..RolloutConfig::default()
            };
            GtpEngine::with_board(board, search, rollout, engine).run()
        }
        Some(Commands::Demo) | None => run_demo(),
    }
}

fn run_demo() -> Result<()> {
    println!("Michi-Gomoku: Gomoku search and rollout engine\n");

    let mut board = Board::new(DEFAULT_SIZE)?;
    let mut searcher = Searcher::new(SearchConfig {
        depth: 3,
        mode: SearchMode::FastCandidates,
        ..SearchConfig::default()
    });
    let mut rollout = RolloutPlayer::new(RolloutConfig {
        seed: Some(1),
        ..RolloutConfig::default()
    });

    // Black uses rollouts, White the alpha-beta search.
    while !board.end_of_game() {
        let player = board.current_player();
        let pt = match player {
            Color::Black => rollout.genmove(&mut board),
            Color::White => searcher.search(&mut board).best_move,
        };
        let Some(pt) = pt else { break };
        board.play(pt)?;
        println!("{}: {}", player, board.format_vertex(pt));
    }

    println!("\n{board}");
    match board.winner() {
        Some(color) => println!("Winner: {color}"),
        None => println!("Draw"),
    }
    Ok(())
}
