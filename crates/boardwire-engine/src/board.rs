//! The packed 3×3 board and everything that reads or writes it.
//!
//! A board is three bytes, one per row. Inside a row byte, cell `x` lives
//! in bits `[2x, 2x+1]`:
//!
//! ```text
//!  bit   7 6 | 5 4 | 3 2 | 1 0
//!        --- | x=2 | x=1 | x=0
//! ```
//!
//! This is also the exact wire encoding of a BoardState payload, so
//! [`Board::to_wire`] and [`Board::from_wire`] are plain copies plus
//! validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BoardError, Square};

/// Size of a board on the wire, in bytes.
pub const WIRE_LEN: usize = 3;

const CELL_MASK: u8 = 0b11;
/// Bits 6–7 of a row byte carry no cell.
const ROW_MASK: u8 = 0b0011_1111;

/// Every winning line, in scan order: rows top to bottom, columns left
/// to right, main diagonal, anti-diagonal. `winner` returns the first
/// match, which keeps results reproducible for boards that legal play
/// could never produce.
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(2, 0), (1, 1), (0, 2)],
];

// ---------------------------------------------------------------------------
// Cell, Player, Outcome
// ---------------------------------------------------------------------------

/// What a single cell holds. The discriminants are the 2-bit wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty = 0,
    PlayerOne = 1,
    PlayerTwo = 2,
}

impl Cell {
    /// Decodes a 2-bit field. `0b11` is not a cell.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Empty),
            1 => Some(Self::PlayerOne),
            2 => Some(Self::PlayerTwo),
            _ => None,
        }
    }

    /// The 2-bit wire value.
    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// The player owning this cell, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Self::Empty => None,
            Self::PlayerOne => Some(Player::One),
            Self::PlayerTwo => Some(Player::Two),
        }
    }
}

/// One of the two sides. The server plays `One` (X), the client `Two` (O).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// The mark drawn for this player's cells.
    pub fn mark(self) -> char {
        match self {
            Self::One => 'X',
            Self::Two => 'O',
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Cell::PlayerOne,
            Player::Two => Cell::PlayerTwo,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "PlayerOne"),
            Self::Two => write!(f, "PlayerTwo"),
        }
    }
}

/// How a finished game ended, from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    Draw,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A tic-tac-toe board packed into three bytes.
///
/// Invariant: no cell field ever holds `0b11`. [`Board::assign`] only
/// writes player values and [`Board::from_wire`] rejects `0b11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    rows: [u8; WIRE_LEN],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a BoardState payload.
    ///
    /// # Errors
    /// [`BoardError::WrongLength`] unless `bytes` is exactly three bytes,
    /// [`BoardError::InvalidCell`] if any cell field is `0b11`.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, BoardError> {
        let rows: [u8; WIRE_LEN] = bytes
            .try_into()
            .map_err(|_| BoardError::WrongLength(bytes.len()))?;

        let mut board = Board::new();
        for (y, row) in rows.iter().enumerate() {
            let row = row & ROW_MASK;
            for x in 0..3 {
                let value = (row >> (x * 2)) & CELL_MASK;
                if Cell::from_bits(value).is_none() {
                    return Err(BoardError::InvalidCell { x, y, value });
                }
            }
            board.rows[y] = row;
        }
        Ok(board)
    }

    /// The three-byte wire form.
    pub fn to_wire(&self) -> [u8; WIRE_LEN] {
        self.rows
    }

    /// Reads cell `(x, y)`. Both coordinates must be in `0..3`.
    pub fn owner(&self, x: usize, y: usize) -> Cell {
        debug_assert!(x < 3 && y < 3, "cell ({x}, {y}) is off the board");
        let bits = (self.rows[y] >> (x * 2)) & CELL_MASK;
        Cell::from_bits(bits).unwrap_or(Cell::Empty)
    }

    /// Writes `player` into cell `(x, y)`.
    ///
    /// Occupancy is not checked; callers look at [`Board::owner`] first.
    pub fn assign(&mut self, x: usize, y: usize, player: Player) {
        debug_assert!(x < 3 && y < 3, "cell ({x}, {y}) is off the board");
        let shift = x * 2;
        let cleared = self.rows[y] & !(CELL_MASK << shift);
        self.rows[y] = cleared | (Cell::from(player).bits() << shift);
    }

    /// [`Board::owner`] for a validated square.
    pub fn owner_at(&self, square: Square) -> Cell {
        self.owner(square.x(), square.y())
    }

    /// [`Board::assign`] for a validated square.
    pub fn assign_at(&mut self, square: Square, player: Player) {
        self.assign(square.x(), square.y(), player);
    }

    /// The first completed line's owner in scan order, or `Empty`.
    pub fn winner(&self) -> Cell {
        for line in LINES {
            let [a, b, c] = line.map(|(x, y)| self.owner(x, y));
            if !a.is_empty() && a == b && b == c {
                return a;
            }
        }
        Cell::Empty
    }

    /// `true` when no cell is empty.
    pub fn is_full(&self) -> bool {
        Square::all().all(|sq| !self.owner_at(sq).is_empty())
    }

    /// `true` once someone has won or the board is full.
    pub fn is_over(&self) -> bool {
        !self.winner().is_empty() || self.is_full()
    }

    /// The result for `player`, or `None` while the game is still open.
    pub fn outcome_for(&self, player: Player) -> Option<Outcome> {
        match self.winner().player() {
            Some(winner) if winner == player => Some(Outcome::Won),
            Some(_) => Some(Outcome::Lost),
            None if self.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }

    /// Squares nobody has played yet, row-major.
    pub fn empty_squares(&self) -> impl Iterator<Item = Square> + '_ {
        Square::all().filter(|sq| self.owner_at(*sq).is_empty())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..3 {
            if y > 0 {
                writeln!(f, "---+---+---")?;
            }
            let marks: Vec<char> = (0..3)
                .map(|x| self.owner(x, y).player().map_or('.', Player::mark))
                .collect();
            writeln!(f, " {} | {} | {} ", marks[0], marks[1], marks[2])?;
        }
        Ok(())
    }
}
