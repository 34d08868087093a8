//! Michi-Gomoku: a small Gomoku (five in a row) engine.
//!
//! This crate provides an exact / heuristic alpha-beta solver and a Monte
//! Carlo rollout player for freestyle Gomoku on square boards from 2x2 to
//! 19x19. Five or more in a row wins; a full board without one is a draw.
//!
//! ## Modules
//!
//! - [`constants`] - Board limits, scores and engine parameters
//! - [`board`] - Padded 1D board with make/unmake and Zobrist hashing
//! - [`patterns`] - Tactical detectors (win, block, open fours, double three)
//! - [`transposition`] - Hash-keyed cache of search results
//! - [`search`] - Negamax alpha-beta with tactical move restriction
//! - [`rollout`] - Simulated games for move selection
//! - [`gtp`] - Text protocol front end
//!
//! ## Example
//!
//! ```
//! use michi_gomoku::board::{Board, Color};
//! use michi_gomoku::search::{SearchConfig, solve};
//!
//! let mut board = Board::new(9)?;
//! for col in 3..=6 {
//!     board.play_move(board.pt(4, col), Color::Black)?;
//! }
//! board.set_current_player(Color::Black);
//!
//! let result = solve(&mut board, SearchConfig::default());
//! assert!(result.is_win());
//! println!("Winning move: {}", board.format_vertex(result.best_move.unwrap()));
//! # Ok::<(), michi_gomoku::board::BoardError>(())
//! ```

pub mod board;
pub mod constants;
pub mod gtp;
pub mod patterns;
pub mod rollout;
pub mod search;
pub mod transposition;
