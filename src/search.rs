//! Depth-limited negamax search with alpha-beta pruning.
//!
//! This module implements the exact / heuristic solver:
//! - Negamax with fail-hard alpha-beta cutoffs
//! - Tactical move restriction from the [`patterns`](crate::patterns)
//!   detectors, so a forcing move collapses the branching factor to one
//! - A forced-loss shortcut when the opponent holds two winning points
//! - Transposition table lookups keyed by the board hash
//!
//! Scores are from the point of view of the side to move and lie in
//! `LOSS_SCORE..=WIN_SCORE` at the leaves. The board is searched in place:
//! every move made during the search is unmade before the call returns.

use tracing::{debug, trace};

use crate::board::{Board, Color, Point};
use crate::constants::{DEFAULT_DEPTH, LOSS_SCORE, SCORE_BOUND, WIN_SCORE};
use crate::patterns::{self, Tactic};
use crate::transposition::{Bound, TranspositionTable};

/// How the move list of a node is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Every empty point unless an immediate win exists. Solves exactly.
    Exhaustive,
    /// Tactical restriction, then every empty point with double threes
    /// first.
    #[default]
    HeuristicRestricted,
    /// Tactical restriction, then only points next to a stone.
    FastCandidates,
}

/// Settings for a [`Searcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Plies to search from the root. Zero is treated as one.
    pub depth: u32,
    pub mode: SearchMode,
    /// Consult the transposition table before expanding a node.
    pub use_table: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            mode: SearchMode::default(),
            use_table: true,
        }
    }
}

/// Outcome of a root search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Score for the side to move at the root.
    pub score: i32,
    /// `None` only if the game was already over.
    pub best_move: Option<Point>,
    /// The detector that restricted the root move list, if any.
    pub tactic: Option<Tactic>,
    pub nodes: u64,
    pub table_hits: u64,
}

impl SearchResult {
    #[inline]
    pub fn is_win(&self) -> bool {
        self.score >= WIN_SCORE
    }

    #[inline]
    pub fn is_loss(&self) -> bool {
        self.score <= LOSS_SCORE
    }
}

/// Move list of one node.
enum Expansion {
    /// A detector fired; only `point` is searched.
    Forced { tactic: Tactic, point: Point },
    Open(Vec<Point>),
}

/// Negamax searcher owning its transposition table.
///
/// The table survives between calls to [`Searcher::search`], which is sound
/// because its key covers the whole position; it is cleared when the search
/// mode changes since the move lists, and so the scores, depend on it.
pub struct Searcher {
    config: SearchConfig,
    table: TranspositionTable,
    nodes: u64,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            table: TranspositionTable::new(),
            nodes: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        if config.mode != self.config.mode {
            self.table.clear();
        }
        self.config = config;
    }

    #[inline]
    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    pub fn clear_table(&mut self) {
        self.table.clear();
    }

    /// Search the position for the side to move and pick a move.
    ///
    /// Among root moves, the first one reaching the best score is kept, so a
    /// winning move is preferred over any merely improving one and ties go
    /// to generation order. The board is returned in its entry state.
    pub fn search(&mut self, board: &mut Board) -> SearchResult {
        self.nodes = 0;
        let hits_before = self.table.hits();

        if board.end_of_game() {
            return SearchResult {
                score: board.evaluate_terminal_for_side_to_move(),
                best_move: None,
                tactic: None,
                nodes: 0,
                table_hits: 0,
            };
        }

        let depth = self.config.depth.max(1);
        // The root always needs a move, so the forced-loss shortcut does
        // not apply here: a lost root still plays its best block.
        let (tactic, moves) = match self.expand(board) {
            Expansion::Forced { tactic, point } => (Some(tactic), vec![point]),
            Expansion::Open(moves) => (None, moves),
        };

        let mut alpha = -SCORE_BOUND;
        let beta = SCORE_BOUND;
        let mut best_move = None;
        for pt in moves {
            board.make(pt);
            let value = -self.alpha_beta(board, -beta, -alpha, depth - 1);
            board.unmake();
            if value > alpha {
                alpha = value;
                best_move = Some(pt);
            }
            if alpha >= WIN_SCORE {
                break;
            }
        }
        self.store(board.hash(), alpha, depth, Bound::Exact);

        let result = SearchResult {
            score: alpha,
            best_move,
            tactic,
            nodes: self.nodes,
            table_hits: self.table.hits() - hits_before,
        };
        debug!(
            mode = ?self.config.mode,
            depth,
            score = result.score,
            best = ?result.best_move.map(|pt| board.format_vertex(pt)),
            tactic = ?result.tactic,
            nodes = result.nodes,
            table_hits = result.table_hits,
            "search finished"
        );
        result
    }

    /// Negamax value of the position for the side to move, searched
    /// `depth` plies deep inside the `(alpha, beta)` window.
    pub fn alpha_beta(&mut self, board: &mut Board, mut alpha: i32, beta: i32, depth: u32) -> i32 {
        self.nodes += 1;

        if depth == 0 || board.end_of_game() {
            let score = board.evaluate_terminal_for_side_to_move();
            self.store(board.hash(), score, depth, Bound::Exact);
            return score;
        }

        let hash = board.hash();
        if self.config.use_table {
            if let Some(score) = self.table.probe(hash, depth, alpha, beta) {
                return score;
            }
        }

        if self.config.mode != SearchMode::Exhaustive
            && patterns::forced_loss(board, board.current_player())
        {
            self.store(hash, LOSS_SCORE, depth, Bound::Exact);
            return LOSS_SCORE;
        }

        let moves = match self.expand(board) {
            Expansion::Forced { tactic, point } => {
                trace!(?tactic, point, "forced move");
                vec![point]
            }
            Expansion::Open(moves) => moves,
        };

        let alpha_orig = alpha;
        for pt in moves {
            board.make(pt);
            let value = -self.alpha_beta(board, -beta, -alpha, depth - 1);
            board.unmake();
            if value >= beta {
                self.store(hash, beta, depth, Bound::Lower);
                return beta;
            }
            if value > alpha {
                alpha = value;
            }
        }

        let bound = if alpha > alpha_orig {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.store(hash, alpha, depth, bound);
        alpha
    }

    /// Build the move list for the side to move according to the mode.
    ///
    /// An immediate win is taken in every mode. The remaining detectors
    /// only restrict the heuristic modes.
    fn expand(&self, board: &Board) -> Expansion {
        let color = board.current_player();
        if let Some(&point) = patterns::immediate_win(board, color).first() {
            return Expansion::Forced {
                tactic: Tactic::Win,
                point,
            };
        }
        if self.config.mode == SearchMode::Exhaustive {
            return Expansion::Open(board.empty_points());
        }

        let detectors: [(Tactic, fn(&Board, Color) -> Vec<Point>); 3] = [
            (Tactic::BlockWin, patterns::block_immediate_win),
            (Tactic::OpenFour, patterns::open_four),
            (Tactic::BlockOpenFour, patterns::block_open_four),
        ];
        for (tactic, detect) in detectors {
            if let Some(&point) = detect(board, color).first() {
                return Expansion::Forced { tactic, point };
            }
        }

        let threes = patterns::double_three(board, color);
        match self.config.mode {
            SearchMode::FastCandidates => match threes.first() {
                Some(&point) => Expansion::Forced {
                    tactic: Tactic::DoubleThree,
                    point,
                },
                None => Expansion::Open(patterns::fast_candidates(board)),
            },
            SearchMode::Exhaustive | SearchMode::HeuristicRestricted => {
                // Double threes go first; every point is still searched.
                let mut moves = board.empty_points();
                moves.retain(|pt| !threes.contains(pt));
                moves.splice(0..0, threes);
                Expansion::Open(moves)
            }
        }
    }

    #[inline]
    fn store(&mut self, hash: u64, score: i32, depth: u32, bound: Bound) {
        if self.config.use_table {
            self.table.store(hash, score, depth, bound);
        }
    }
}

/// One-shot search with a fresh table.
pub fn solve(board: &mut Board, config: SearchConfig) -> SearchResult {
    Searcher::new(config).search(board)
}
