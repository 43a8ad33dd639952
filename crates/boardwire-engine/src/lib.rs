//! Game engine for Boardwire.
//!
//! Pure logic over a packed 3×3 tic-tac-toe board: reading and writing
//! cells, detecting a winner or a draw, and turning human square numbers
//! into coordinates. Nothing here knows about sockets or frames.
//!
//! # Key types
//!
//! - [`Board`]: three bytes, two bits per cell, row-major
//! - [`Cell`] / [`Player`] / [`Outcome`]: what a cell holds, who plays,
//!   how it ended
//! - [`Square`]: a validated coordinate, numbered 1–9 for humans

mod board;
mod error;
mod square;

pub use board::{Board, Cell, Outcome, Player, WIRE_LEN};
pub use error::{BoardError, SelectionError};
pub use square::Square;
