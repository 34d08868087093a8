//! Constants for board geometry, scores, and engine parameters.
//!
//! The board is a 1D array with one shared border column between rows and a
//! border row above and below, so every playable point has eight neighbours
//! reachable by a fixed offset without bounds checks.
//!
//! # Board Size
//!
//! Unlike Go engines that fix the size at compile time, the size is chosen
//! when a [`Board`](crate::board::Board) is built, within
//! [`MIN_SIZE`]`..=`[`MAXSIZE`].

// =============================================================================
// Board Geometry
// =============================================================================

/// Smallest supported board edge.
pub const MIN_SIZE: usize = 2;

/// Largest supported board edge.
pub const MAXSIZE: usize = 19;

/// Board size used by the text driver until `boardsize` is sent.
pub const DEFAULT_SIZE: usize = 7;

/// Stones in a row needed to win.
pub const WIN_LENGTH: usize = 5;

// =============================================================================
// Scores
// =============================================================================

/// Canonical score for a won position (side to move wins).
pub const WIN_SCORE: i32 = 1;

/// Score for a drawn or undecided position.
pub const DRAW_SCORE: i32 = 0;

/// Canonical score for a lost position (side to move loses).
pub const LOSS_SCORE: i32 = -1;

/// Alpha-beta sentinel. Only brackets the recursion, never returned as a
/// leaf score.
pub const SCORE_BOUND: i32 = 100;

// =============================================================================
// Engine Parameters
// =============================================================================

/// Default negamax depth limit.
pub const DEFAULT_DEPTH: u32 = 6;

/// Default number of rollouts per candidate move.
pub const N_SIMS: usize = 10;
