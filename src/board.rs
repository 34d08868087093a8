//! Gomoku board representation and move execution.
//!
//! This module provides the state every other module works on:
//! - Grid storage using a 1D array with border padding
//! - Move history with make/unmake
//! - Incremental Zobrist hashing
//! - Win detection along the four lines through the last move
//!
//! The board is mutated in place for the whole of a search. Every routine
//! that plays a move on it must unplay that move before returning, on every
//! exit path, so that sibling moves see the exact same position.

use std::fmt;

use thiserror::Error;

use crate::constants::{DEFAULT_SIZE, DRAW_SCORE, LOSS_SCORE, MAXSIZE, MIN_SIZE, WIN_LENGTH};

/// A point on the board, represented as an index into the 1D cell array.
pub type Point = usize;

/// Seed for the Zobrist key generator. Fixed so hashes are reproducible.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Stone color, also used for the side to move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other color.
    #[inline]
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "b"),
            Color::White => write!(f, "w"),
        }
    }
}

/// State of one cell of the padded grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Black,
    White,
    /// Padding outside the playable area.
    Border,
}

impl Cell {
    /// The stone color on this cell, if any.
    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Black => Some(Color::Black),
            Cell::White => Some(Color::White),
            Cell::Empty | Cell::Border => None,
        }
    }
}

impl From<Color> for Cell {
    #[inline]
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Cell::Black,
            Color::White => Cell::White,
        }
    }
}

/// Precondition violations on board operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board size {size} is outside {min}..={max}", min = MIN_SIZE, max = MAXSIZE)]
    SizeOutOfRange { size: usize },

    #[error("illegal move: point {0} is not empty")]
    Occupied(Point),

    #[error("illegal move: point {0} is off the board")]
    OffBoard(Point),

    #[error("no move to undo")]
    EmptyHistory,
}

/// A Gomoku board.
///
/// Cells are stored row by row with a stride of `size + 1`: column 0 of each
/// row is a border cell shared by the right edge of the previous row, and
/// there is a full border row above and below. The four line directions are
/// then `1`, `stride`, `stride + 1` and `stride - 1`.
#[derive(Clone)]
pub struct Board {
    size: usize,
    stride: usize,
    cells: Vec<Cell>,
    moves: Vec<Point>,
    current_player: Color,
    hash: u64,
    /// Zobrist keys per cell, indexed by `Color::index`.
    keys: Vec<[u64; 2]>,
    /// XORed into the hash while White is to move.
    white_to_move_key: u64,
}

impl Board {
    /// Create an empty board with Black to move.
    ///
    /// # Errors
    /// [`BoardError::SizeOutOfRange`] if `size` is outside
    /// `MIN_SIZE..=MAXSIZE`.
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if !(MIN_SIZE..=MAXSIZE).contains(&size) {
            return Err(BoardError::SizeOutOfRange { size });
        }
        Ok(Self::with_size(size))
    }

    fn with_size(size: usize) -> Self {
        let stride = size + 1;
        let len = size * size + 3 * (size + 1);

        let mut cells = vec![Cell::Border; len];
        for row in 1..=size {
            let start = row * stride + 1;
            cells[start..start + size].fill(Cell::Empty);
        }

        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
        let keys = (0..len).map(|_| [rng.u64(..), rng.u64(..)]).collect();
        let white_to_move_key = rng.u64(..);
        // Boards of different sizes never share a hash.
        let size_key = fastrand::Rng::with_seed(ZOBRIST_SEED ^ size as u64).u64(..);

        Self {
            size,
            stride,
            cells,
            moves: Vec::with_capacity(size * size),
            current_player: Color::Black,
            hash: size_key,
            keys,
            white_to_move_key,
        }
    }

    /// Create a board and play `moves` alternately, Black first.
    pub fn from_moves(size: usize, moves: &[Point]) -> Result<Self, BoardError> {
        let mut board = Self::new(size)?;
        for &pt in moves {
            board.play(pt)?;
        }
        Ok(board)
    }

    /// Clear all stones and give the move back to Black.
    pub fn reset(&mut self) {
        self.reset_to_move_number(0);
        self.set_current_player(Color::Black);
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance between vertically adjacent points.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Length of the padded cell array.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// True when no stone has been played.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    #[inline]
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    /// Give the move to `color` without playing a stone.
    pub fn set_current_player(&mut self, color: Color) {
        self.toggle_side(self.current_player, color);
        self.current_player = color;
    }

    /// Zobrist hash of stones, side to move and board size.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Points played so far, in order.
    #[inline]
    pub fn moves(&self) -> &[Point] {
        &self.moves
    }

    #[inline]
    pub fn move_number(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn last_move(&self) -> Option<Point> {
        self.moves.last().copied()
    }

    /// Cell state at `pt`. Anything outside the array reads as border.
    #[inline]
    pub fn get(&self, pt: Point) -> Cell {
        self.cells.get(pt).copied().unwrap_or(Cell::Border)
    }

    /// The four line directions: horizontal, vertical and both diagonals.
    #[inline]
    pub fn directions(&self) -> [isize; 4] {
        let s = self.stride as isize;
        [1, s, s + 1, s - 1]
    }

    /// All 8 neighbours of a point. Only valid for playable points.
    #[inline]
    pub fn neighbors(&self, pt: Point) -> [Point; 8] {
        let s = self.stride;
        [
            pt - s - 1,
            pt - s,
            pt - s + 1,
            pt - 1,
            pt + 1,
            pt + s - 1,
            pt + s,
            pt + s + 1,
        ]
    }

    /// Point index from a 1-based `(row, col)` pair. Row 1 is the bottom line.
    #[inline]
    pub fn pt(&self, row: usize, col: usize) -> Point {
        debug_assert!((1..=self.size).contains(&row) && (1..=self.size).contains(&col));
        row * self.stride + col
    }

    /// 1-based `(row, col)` of a point.
    #[inline]
    pub fn coord(&self, pt: Point) -> (usize, usize) {
        (pt / self.stride, pt % self.stride)
    }

    /// Whether `pt` is a playable point.
    #[inline]
    pub fn on_board(&self, pt: Point) -> bool {
        !matches!(self.get(pt), Cell::Border)
    }

    /// Number of stones on the board.
    #[inline]
    pub fn stone_count(&self) -> usize {
        self.moves.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.moves.len() == self.size * self.size
    }

    /// All empty points in row-major order, bottom row first.
    pub fn empty_points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.size * self.size - self.moves.len());
        for row in 1..=self.size {
            let start = row * self.stride + 1;
            points.extend((start..start + self.size).filter(|&pt| self.cells[pt] == Cell::Empty));
        }
        points
    }

    /// Play `color` at `pt`.
    ///
    /// Only emptiness is checked. The side to move becomes the opponent of
    /// `color`, so callers that manage turn order themselves may place either
    /// color.
    ///
    /// # Errors
    /// [`BoardError::OffBoard`] or [`BoardError::Occupied`].
    pub fn play_move(&mut self, pt: Point, color: Color) -> Result<(), BoardError> {
        match self.get(pt) {
            Cell::Empty => {}
            Cell::Border => return Err(BoardError::OffBoard(pt)),
            Cell::Black | Cell::White => return Err(BoardError::Occupied(pt)),
        }
        self.place(pt, color);
        Ok(())
    }

    /// Play the side to move at `pt`.
    pub fn play(&mut self, pt: Point) -> Result<(), BoardError> {
        self.play_move(pt, self.current_player)
    }

    /// Take back the last move, returning its point.
    ///
    /// # Errors
    /// [`BoardError::EmptyHistory`] if no move has been played.
    pub fn undo_move(&mut self) -> Result<Point, BoardError> {
        let pt = self.moves.pop().ok_or(BoardError::EmptyHistory)?;
        self.lift(pt);
        Ok(pt)
    }

    /// Undo moves until exactly `n` remain.
    pub fn reset_to_move_number(&mut self, n: usize) {
        while self.moves.len() > n {
            self.unmake();
        }
    }

    /// Play the side to move at an empty point. Hot-path variant of
    /// [`Board::play`] for callers that generate `pt` from the empty set.
    #[inline]
    pub(crate) fn make(&mut self, pt: Point) {
        debug_assert_eq!(self.cells[pt], Cell::Empty, "make on non-empty point {pt}");
        self.place(pt, self.current_player);
    }

    /// Undo the last move. Must be paired with a previous [`Board::make`]
    /// or successful play.
    #[inline]
    pub(crate) fn unmake(&mut self) {
        match self.moves.pop() {
            Some(pt) => self.lift(pt),
            None => debug_assert!(false, "unmake with empty history"),
        }
    }

    fn lift(&mut self, pt: Point) {
        if let Some(color) = self.cells[pt].color() {
            self.cells[pt] = Cell::Empty;
            self.hash ^= self.keys[pt][color.index()];
            self.set_current_player(color);
        }
    }

    fn place(&mut self, pt: Point, color: Color) {
        self.cells[pt] = Cell::from(color);
        self.hash ^= self.keys[pt][color.index()];
        self.moves.push(pt);
        self.set_current_player(color.opponent());
    }

    #[inline]
    fn toggle_side(&mut self, from: Color, to: Color) {
        if from != to {
            self.hash ^= self.white_to_move_key;
        }
    }

    /// Length of the run of `color` through `pt` along direction `d`,
    /// counting `pt` itself as `color` whatever it holds.
    pub fn run_length(&self, pt: Point, d: isize, color: Color) -> usize {
        let cell = Cell::from(color);
        let mut count = 1;
        for step in [d, -d] {
            let mut p = pt;
            while let Some(next) = p.checked_add_signed(step) {
                if self.get(next) != cell {
                    break;
                }
                count += 1;
                p = next;
            }
        }
        count
    }

    /// Whether the stone at `pt` is part of a line of five or more.
    pub fn makes_five(&self, pt: Point) -> bool {
        match self.get(pt).color() {
            Some(color) => self
                .directions()
                .into_iter()
                .any(|d| self.run_length(pt, d, color) >= WIN_LENGTH),
            None => false,
        }
    }

    /// Whether the last move completed five in a row. Only the four lines
    /// through that move are examined.
    #[inline]
    pub fn is_terminal_after_last_move(&self) -> bool {
        self.last_move().is_some_and(|pt| self.makes_five(pt))
    }

    /// The player who just completed five, if any.
    pub fn winner(&self) -> Option<Color> {
        let pt = self.last_move()?;
        if self.makes_five(pt) {
            self.get(pt).color()
        } else {
            None
        }
    }

    /// True when the last move won or no empty point is left.
    #[inline]
    pub fn end_of_game(&self) -> bool {
        self.is_terminal_after_last_move() || self.is_full()
    }

    /// Static score for the side to move: a loss if the previous mover just
    /// made five, otherwise a draw.
    #[inline]
    pub fn evaluate_terminal_for_side_to_move(&self) -> i32 {
        if self.is_terminal_after_last_move() {
            LOSS_SCORE
        } else {
            DRAW_SCORE
        }
    }

    /// Parse a vertex such as `"c4"`.
    ///
    /// Columns use letters `A..` skipping `I`; rows count from 1 at the
    /// bottom. Returns `None` for pass or anything off the board.
    pub fn parse_vertex(&self, s: &str) -> Option<Point> {
        let s = s.trim();
        let (col_char, digits) = s.split_at_checked(1)?;
        let col_char = col_char.chars().next()?.to_ascii_uppercase();
        if !col_char.is_ascii_uppercase() || col_char == 'I' {
            return None;
        }
        let mut col = (col_char as u8 - b'A' + 1) as usize;
        if col_char > 'I' {
            col -= 1;
        }
        let row: usize = digits.parse().ok()?;
        if !(1..=self.size).contains(&row) || !(1..=self.size).contains(&col) {
            return None;
        }
        Some(self.pt(row, col))
    }

    /// Format a point as a vertex, the inverse of [`Board::parse_vertex`].
    pub fn format_vertex(&self, pt: Point) -> String {
        let (row, col) = self.coord(pt);
        let mut c = b'A' + col as u8 - 1;
        if c >= b'I' {
            c += 1;
        }
        format!("{}{row}", c as char)
    }
}

impl Default for Board {
    /// An empty board of [`DEFAULT_SIZE`].
    fn default() -> Self {
        Self::with_size(DEFAULT_SIZE)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (1..=self.size).rev() {
            write!(f, "{row:>2} ")?;
            for col in 1..=self.size {
                let ch = match self.cells[self.pt(row, col)] {
                    Cell::Black => 'X',
                    Cell::White => 'O',
                    Cell::Empty | Cell::Border => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        write!(f, "   ")?;
        for col in 1..=self.size {
            let mut c = b'A' + col as u8 - 1;
            if c >= b'I' {
                c += 1;
            }
            write!(f, "{} ", c as char)?;
        }
        writeln!(f)
    }
}
