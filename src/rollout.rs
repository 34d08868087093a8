//! Monte Carlo rollouts (simulated games) for move selection.
//!
//! Each candidate move is played, then a fixed number of games are played
//! out from the resulting position to a five or a full board. A candidate's
//! score is its estimated probability of winning for the side that played it.
//!
//! Two playout policies are available:
//! - [`Policy::Random`]: uniform over empty points
//! - [`Policy::RuleBased`]: the highest-priority tactical detector that
//!   fires, falling back to uniform random

use tracing::debug;

use crate::board::{Board, Color, Point};
use crate::constants::N_SIMS;
use crate::patterns::policy_moves;

/// Move choice inside a playout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    Random,
    #[default]
    RuleBased,
}

/// Playout settings for a [`RolloutPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloutConfig {
    /// Playouts per candidate move. Zero is treated as one.
    pub simulations: usize,
    pub policy: Policy,
    /// Seed for reproducible runs; `None` seeds from the system.
    pub seed: Option<u64>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            simulations: N_SIMS,
            policy: Policy::default(),
            seed: None,
        }
    }
}

/// Outcome counts for one candidate move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RolloutStats {
    pub black_wins: usize,
    /// Playouts that filled the board without a five.
    pub draws: usize,
    pub white_wins: usize,
}

impl RolloutStats {
    /// Count one playout result.
    #[inline]
    pub fn record(&mut self, winner: Option<Color>) {
        match winner {
            Some(Color::Black) => self.black_wins += 1,
            Some(Color::White) => self.white_wins += 1,
            None => self.draws += 1,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.black_wins + self.draws + self.white_wins
    }

    /// Expected result for Black, counting a draw as half a win.
    pub fn black_score(&self) -> f64 {
        let n = self.total();
        if n == 0 {
            return 0.5;
        }
        (self.black_wins as f64 + 0.5 * self.draws as f64) / n as f64
    }

    /// Expected result for `color`.
    pub fn score_for(&self, color: Color) -> f64 {
        match color {
            Color::Black => self.black_score(),
            Color::White => 1.0 - self.black_score(),
        }
    }
}

/// Rollout result for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvaluation {
    pub point: Point,
    /// Winning chance for the side that played `point`.
    pub score: f64,
    pub stats: RolloutStats,
}

/// Pick the next playout move for the side to move.
pub fn choose_move(board: &Board, policy: Policy, rng: &mut fastrand::Rng) -> Option<Point> {
    let candidates = match policy {
        Policy::Random => board.empty_points(),
        Policy::RuleBased => policy_moves(board, board.current_player()).1,
    };
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng.usize(..candidates.len())])
    }
}

/// Play the game out to a five or a full board and return the winner.
///
/// The moves stay on the board; callers reset with
/// [`Board::reset_to_move_number`].
pub fn simulate(board: &mut Board, policy: Policy, rng: &mut fastrand::Rng) -> Option<Color> {
    while !board.end_of_game() {
        match choose_move(board, policy, rng) {
            Some(pt) => board.make(pt),
            None => break,
        }
    }
    board.winner()
}

/// Rollout-based move selector.
pub struct RolloutPlayer {
    config: RolloutConfig,
    rng: fastrand::Rng,
}

impl Default for RolloutPlayer {
    fn default() -> Self {
        Self::new(RolloutConfig::default())
    }
}

impl RolloutPlayer {
    pub fn new(config: RolloutConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &RolloutConfig {
        &self.config
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.config.policy = policy;
    }

    pub fn set_simulations(&mut self, simulations: usize) {
        self.config.simulations = simulations;
    }

    /// Play `pt` for the side to move and run the configured number of
    /// playouts from there. Each playout starts from the position right
    /// after `pt`; the board is back in its entry state on return.
    pub fn evaluate_move(&mut self, board: &mut Board, pt: Point) -> MoveEvaluation {
        let mover = board.current_player();
        let n = self.config.simulations.max(1);

        board.make(pt);
        let move_number = board.move_number();
        let mut stats = RolloutStats::default();
        for _ in 0..n {
            let winner = simulate(board, self.config.policy, &mut self.rng);
            stats.record(winner);
            board.reset_to_move_number(move_number);
        }
        board.unmake();

        debug_assert_eq!(stats.total(), n);
        MoveEvaluation {
            point: pt,
            score: stats.score_for(mover),
            stats,
        }
    }

    /// Evaluate every empty point, in board order.
    pub fn evaluate_all(&mut self, board: &mut Board) -> Vec<MoveEvaluation> {
        board
            .empty_points()
            .into_iter()
            .map(|pt| self.evaluate_move(board, pt))
            .collect()
    }

    /// The empty point with the highest rollout score; the first one wins
    /// ties. `None` on a full board.
    pub fn genmove(&mut self, board: &mut Board) -> Option<Point> {
        let mut best: Option<MoveEvaluation> = None;
        for eval in self.evaluate_all(board) {
            debug!(
                point = %board.format_vertex(eval.point),
                score = eval.score,
                black = eval.stats.black_wins,
                draws = eval.stats.draws,
                white = eval.stats.white_wins,
                "rollout candidate"
            );
            if best.is_none_or(|b| eval.score > b.score) {
                best = Some(eval);
            }
        }
        best.map(|b| b.point)
    }
}
