//! Go Text Protocol (GTP) front end.
//!
//! Reads one command per line from stdin, with an optional numeric id, and
//! answers `= result` or `? error`. Vertices use GTP letters (no `I`) and
//! 1-based rows counted from the bottom.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`, `list_commands`,
//!   `known_command <cmd>`, `quit`
//! - `boardsize <size>` - Start over on a new board
//! - `clear_board` - Remove all stones and forget cached search results
//! - `play <color> <vertex>` - Place a stone
//! - `genmove <color>` - Pick and play a move for `color`
//! - `showboard` - Print the board
//! - `solve` - Search the position: `b|w|draw|unknown [vertex]`
//! - `policy random|rule_based` - Rollout playout policy
//! - `policy_moves` - Moves the rule-based policy would pick from
//! - `engine rollout|search` - Move generator used by `genmove`
//! - `gogui-rules_final_result` - `b`, `w`, `draw` or `unknown`
//!
//! ## Example
//!
//! ```ignore
//! use michi_gomoku::gtp::GtpEngine;
//! let mut engine = GtpEngine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

use crate::board::{Board, Color, Point};
use crate::patterns::policy_moves;
use crate::rollout::{Policy, RolloutConfig, RolloutPlayer};
use crate::search::{SearchConfig, SearchMode, Searcher};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "engine",
    "genmove",
    "gogui-rules_final_result",
    "known_command",
    "list_commands",
    "name",
    "play",
    "policy",
    "policy_moves",
    "protocol_version",
    "quit",
    "showboard",
    "solve",
    "version",
];

/// Move generator behind `genmove`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
    #[default]
    Rollout,
    Search,
}

impl std::str::FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rollout" => Ok(Engine::Rollout),
            "search" => Ok(Engine::Search),
            other => Err(anyhow!("unknown engine: {other}")),
        }
    }
}

/// GTP engine state.
pub struct GtpEngine {
    board: Board,
    searcher: Searcher,
    rollout: RolloutPlayer,
    engine: Engine,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GtpEngine {
    /// An engine on the default board with default search and rollout settings.
    pub fn new() -> Self {
        Self::with_board(
            Board::default(),
            SearchConfig::default(),
            RolloutConfig::default(),
            Engine::default(),
        )
    }

    pub fn with_board(
        board: Board,
        search: SearchConfig,
        rollout: RolloutConfig,
        engine: Engine,
    ) -> Self {
        Self {
            board,
            searcher: Searcher::new(search),
            rollout: RolloutPlayer::new(rollout),
            engine,
        }
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run the GTP command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line.context("reading GTP input")?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(stdout, "{prefix}{id_str} {message}\n")?;
            stdout.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a GTP command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        let result = match command {
            "name" => Ok("michi-gomoku".to_string()),
            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),
            "protocol_version" => Ok("2".to_string()),
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),
            "known_command" => self.known_command(args),
            "quit" => Ok(String::new()),
            "boardsize" => self.boardsize(args),
            "clear_board" => {
                self.board.reset();
                self.searcher.clear_table();
                Ok(String::new())
            }
            "play" => self.play(args),
            "genmove" => self.genmove(args),
            "showboard" => Ok(format!("\n{}", self.board)),
            "solve" => Ok(self.solve()),
            "policy" => self.policy(args),
            "policy_moves" => Ok(self.policy_moves()),
            "engine" => self.engine(args),
            "gogui-rules_final_result" => Ok(self.final_result()),
            _ => Err(anyhow!("unknown command: {command}")),
        };
        match result {
            Ok(message) => (true, message),
            Err(e) => (false, e.to_string()),
        }
    }

    fn known_command(&self, args: &[&str]) -> Result<String> {
        let cmd = args.first().context("missing argument")?;
        let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
        Ok(known.to_string())
    }

    fn boardsize(&mut self, args: &[&str]) -> Result<String> {
        let arg = args.first().context("missing argument")?;
        let size: usize = arg.parse().context("invalid size")?;
        self.board = Board::new(size).map_err(|e| anyhow!("unacceptable size: {e}"))?;
        self.searcher.clear_table();
        Ok(String::new())
    }

    fn play(&mut self, args: &[&str]) -> Result<String> {
        let [color, vertex, ..] = args else {
            bail!("missing arguments");
        };
        let color = parse_color(color)?;
        let pt = self.parse_point(vertex)?;
        self.board.play_move(pt, color)?;
        Ok(String::new())
    }

    fn genmove(&mut self, args: &[&str]) -> Result<String> {
        let color = parse_color(args.first().context("missing argument")?)?;
        if self.board.winner().is_some() {
            return Ok("resign".to_string());
        }
        if self.board.is_full() {
            return Ok("pass".to_string());
        }

        self.board.set_current_player(color);
        let pt = match self.engine {
            Engine::Rollout => self.rollout.genmove(&mut self.board),
            Engine::Search => self.searcher.search(&mut self.board).best_move,
        }
        .context("no move available")?;
        self.board.play_move(pt, color)?;

        let vertex = self.board.format_vertex(pt);
        debug!(engine = ?self.engine, %color, %vertex, "genmove");
        Ok(vertex)
    }

    /// `b`/`w` plus the winning move for a proven win, the loser's reply
    /// omitted for a proven loss, `draw` plus a move when the search reached
    /// the end of the game, `unknown` otherwise.
    fn solve(&mut self) -> String {
        if let Some(winner) = self.board.winner() {
            return winner.to_string();
        }
        if self.board.is_full() {
            return "draw".to_string();
        }

        let to_move = self.board.current_player();
        let result = self.searcher.search(&mut self.board);
        let vertex = result.best_move.map(|pt| self.board.format_vertex(pt));
        let complete = self.searcher.config().mode != SearchMode::FastCandidates
            && self.searcher.config().depth as usize >= self.board.empty_points().len();

        match vertex {
            Some(v) if result.is_win() => format!("{to_move} {v}"),
            _ if result.is_loss() => to_move.opponent().to_string(),
            Some(v) if complete => format!("draw {v}"),
            _ => "unknown".to_string(),
        }
    }

    fn policy(&mut self, args: &[&str]) -> Result<String> {
        let policy = match args.first().map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("random") => Policy::Random,
            Some("rule_based") => Policy::RuleBased,
            Some(other) => bail!("unknown policy: {other}"),
            None => bail!("missing argument"),
        };
        self.rollout.set_policy(policy);
        Ok(String::new())
    }

    fn policy_moves(&self) -> String {
        if self.board.end_of_game() {
            return String::new();
        }
        let (tactic, mut moves) = policy_moves(&self.board, self.board.current_player());
        moves.sort_unstable();
        let vertices: Vec<String> = moves.iter().map(|&pt| self.board.format_vertex(pt)).collect();
        format!("{tactic} {}", vertices.join(" "))
    }

    fn engine(&mut self, args: &[&str]) -> Result<String> {
        self.engine = args.first().context("missing argument")?.parse()?;
        Ok(String::new())
    }

    fn final_result(&self) -> String {
        match self.board.winner() {
            Some(color) => color.to_string(),
            None if self.board.is_full() => "draw".to_string(),
            None => "unknown".to_string(),
        }
    }

    fn parse_point(&self, vertex: &str) -> Result<Point> {
        self.board
            .parse_vertex(vertex)
            .ok_or_else(|| anyhow!("illegal move: invalid vertex {vertex}"))
    }
}

fn parse_color(s: &str) -> Result<Color> {
    match s.to_ascii_lowercase().as_str() {
        "b" | "black" => Ok(Color::Black),
        "w" | "white" => Ok(Color::White),
        other => Err(anyhow!("invalid color: {other}")),
    }
}
