//! Tactical pattern matching for move generation.
//!
//! Every detector scans all empty points of the board and checks the four
//! lines through each one in both senses. Detectors only read the board.
//!
//! ## Line templates
//!
//! Longer shapes are written as strings, one character per cell along a
//! line, relative to the *attacking* color:
//! - `X`: attacker stone
//! - `O`: defender stone
//! - `.`: empty, reported as a candidate point
//! - `-`: empty, must stay empty but is not reported
//! - `?`: defender stone or board edge (anything that is neither `X` nor empty)
//!
//! A template is anchored on its first `.`; since every empty point is tried
//! as the anchor in all eight half-line directions, mirrored shapes need not
//! be listed separately.
//!
//! ## Priority
//!
//! [`policy_moves`] applies the detectors in a fixed order and stops at the
//! first that fires: win, block win, open four, block open four, double three.

use std::fmt;

use crate::board::{Board, Cell, Color, Point};
use crate::constants::WIN_LENGTH;

/// Shapes one move away from an open four for the attacker. The single `.`
/// is the move that makes the four.
const OPEN_FOUR_SRC: &[&str] = &[
    // three in a row, extended on either side
    "-XXX.-",
    "-.XXX-",
    // split threes, gap filled
    "-X.XX-",
    "-XX.X-",
];

/// Attacker threes that become open fours next move. Every `.` is a point
/// where the defender can break the shape.
const BLOCK_OPEN_FOUR_SRC: &[&str] = &[
    // split threes
    ".X.XX.",
    ".XX.X.",
    // three against the edge or a defender stone, room on the far side
    "?.XXX..",
    // open three
    "-.XXX.-",
];

/// Twos that become an open three, `-XXX-`, when the `.` is filled.
const OPEN_THREE_SRC: &[&str] = &["-.XX-", "-X.X-", "-XX.-"];

/// Which tactical detector produced a move list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tactic {
    /// Completes five for the side to move.
    Win,
    /// Occupies a point where the opponent would complete five.
    BlockWin,
    /// Makes an open four (win in two).
    OpenFour,
    /// Breaks an opponent three before it becomes an open four.
    BlockOpenFour,
    /// Makes two open threes at once.
    DoubleThree,
    /// No detector fired.
    Random,
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tactic::Win => "Win",
            Tactic::BlockWin => "BlockWin",
            Tactic::OpenFour => "OpenFour",
            Tactic::BlockOpenFour => "BlockOpenFour",
            Tactic::DoubleThree => "DoubleThree",
            Tactic::Random => "Random",
        };
        f.write_str(name)
    }
}

/// Empty points where `color` would complete five or more in a row.
pub fn immediate_win(board: &Board, color: Color) -> Vec<Point> {
    board
        .empty_points()
        .into_iter()
        .filter(|&pt| {
            board
                .directions()
                .into_iter()
                .any(|d| board.run_length(pt, d, color) >= WIN_LENGTH)
        })
        .collect()
}

/// Empty points the side `color` must occupy to stop an opponent five.
#[inline]
pub fn block_immediate_win(board: &Board, color: Color) -> Vec<Point> {
    immediate_win(board, color.opponent())
}

/// Empty points where `color` makes an open four.
pub fn open_four(board: &Board, color: Color) -> Vec<Point> {
    scan_templates(board, OPEN_FOUR_SRC, color)
}

/// Empty points where `color` breaks an opponent three that would otherwise
/// become an open four.
pub fn block_open_four(board: &Board, color: Color) -> Vec<Point> {
    scan_templates(board, BLOCK_OPEN_FOUR_SRC, color.opponent())
}

/// Empty points where `color` makes an open three on two or more of the
/// four lines through the point.
pub fn double_three(board: &Board, color: Color) -> Vec<Point> {
    let mut matched = Vec::with_capacity(2);
    board
        .empty_points()
        .into_iter()
        .filter(|&pt| {
            let lines = board
                .directions()
                .into_iter()
                .filter(|&d| {
                    [d, -d].into_iter().any(|dir| {
                        OPEN_THREE_SRC.iter().any(|src| {
                            matched.clear();
                            template_match(board, pt, dir, src.as_bytes(), color, &mut matched)
                        })
                    })
                })
                .count();
            lines >= 2
        })
        .collect()
}

/// The highest-priority detector that fires for the side `color`, with its
/// candidates. Falls back to every empty point under [`Tactic::Random`].
pub fn policy_moves(board: &Board, color: Color) -> (Tactic, Vec<Point>) {
    let detectors: [(Tactic, fn(&Board, Color) -> Vec<Point>); 5] = [
        (Tactic::Win, immediate_win),
        (Tactic::BlockWin, block_immediate_win),
        (Tactic::OpenFour, open_four),
        (Tactic::BlockOpenFour, block_open_four),
        (Tactic::DoubleThree, double_three),
    ];
    for (tactic, detect) in detectors {
        let moves = detect(board, color);
        if !moves.is_empty() {
            return (tactic, moves);
        }
    }
    (Tactic::Random, board.empty_points())
}

/// Whether `color`, to move, is lost whatever it plays: it cannot make five
/// itself and the opponent has two or more distinct points completing five.
pub fn forced_loss(board: &Board, color: Color) -> bool {
    immediate_win(board, color).is_empty() && immediate_win(board, color.opponent()).len() >= 2
}

/// Empty points touching at least one stone, in row-major order. On an
/// empty board this is just the centre point.
pub fn fast_candidates(board: &Board) -> Vec<Point> {
    if board.is_empty() {
        let mid = board.size().div_ceil(2);
        return vec![board.pt(mid, mid)];
    }
    board
        .empty_points()
        .into_iter()
        .filter(|&pt| {
            board
                .neighbors(pt)
                .into_iter()
                .any(|n| board.get(n).color().is_some())
        })
        .collect()
}

/// Match every template at every empty point in all eight half-lines.
fn scan_templates(board: &Board, templates: &[&str], attacker: Color) -> Vec<Point> {
    let mut seen = vec![false; board.cell_count()];
    let mut result = Vec::new();
    let mut matched = Vec::with_capacity(8);

    for pt in board.empty_points() {
        for d in board.directions() {
            for dir in [d, -d] {
                for src in templates {
                    matched.clear();
                    if template_match(board, pt, dir, src.as_bytes(), attacker, &mut matched) {
                        for &p in &matched {
                            if !seen[p] {
                                seen[p] = true;
                                result.push(p);
                            }
                        }
                    }
                }
            }
        }
    }
    result
}

/// Match one template with its first `.` on `anchor`, laid out along `dir`.
/// Candidate points are pushed to `out`; `out` is only meaningful on a match.
fn template_match(
    board: &Board,
    anchor: Point,
    dir: isize,
    src: &[u8],
    attacker: Color,
    out: &mut Vec<Point>,
) -> bool {
    let Some(at) = src.iter().position(|&c| c == b'.') else {
        return false;
    };
    if board.get(anchor) != Cell::Empty {
        return false;
    }
    let attacker = Cell::from(attacker);
    out.push(anchor);
    walk(board, anchor, dir, src[at + 1..].iter().copied(), attacker, out)
        && walk(board, anchor, -dir, src[..at].iter().rev().copied(), attacker, out)
}

/// Match `slots` one step at a time away from `anchor`. A template may reach
/// the edge but never past it, so rows do not wrap into each other.
fn walk(
    board: &Board,
    anchor: Point,
    step: isize,
    slots: impl Iterator<Item = u8>,
    attacker: Cell,
    out: &mut Vec<Point>,
) -> bool {
    let mut p = anchor;
    for slot in slots {
        if board.get(p) == Cell::Border {
            return false;
        }
        let Some(next) = p.checked_add_signed(step) else {
            return false;
        };
        p = next;
        let cell = board.get(p);
        let ok = match slot {
            b'X' => cell == attacker,
            b'O' => cell != attacker && cell.color().is_some(),
            b'.' | b'-' => cell == Cell::Empty,
            b'?' => cell != attacker && cell != Cell::Empty,
            _ => false,
        };
        if !ok {
            return false;
        }
        if slot == b'.' {
            out.push(p);
        }
    }
    true
}
