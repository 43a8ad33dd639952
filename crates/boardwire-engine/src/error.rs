//! Error types for the game engine.

use crate::Square;

/// A board snapshot could not be decoded from its wire form.
///
/// Both variants mean the peer sent something a legal board can never
/// look like, so the protocol layer treats them as fatal for the
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The payload was not exactly three row bytes.
    #[error("board payload must be 3 bytes, got {0}")]
    WrongLength(usize),

    /// A 2-bit cell field held a value that is not Empty, PlayerOne
    /// or PlayerTwo. Only `0b11` can trigger this.
    #[error("cell ({x}, {y}) holds invalid value {value}")]
    InvalidCell { x: usize, y: usize, value: u8 },
}

/// A local player picked a square that cannot be played.
///
/// Everything except [`SelectionError::Abandoned`] is recoverable: the
/// session asks again without sending anything to the peer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    /// Squares are numbered 1 through 9.
    #[error("the squares are numbered 1 through 9, got {0}")]
    OutOfRange(i64),

    /// The input was not a number at all.
    #[error("not a square number: {0:?}")]
    Unparsable(String),

    /// The square already has a mark on it.
    #[error("square {0} is occupied")]
    Occupied(Square),

    /// The player gave up (input closed, no empty squares left, ...).
    #[error("no move was selected")]
    Abandoned,
}

impl SelectionError {
    /// Returns `true` if asking the player again can fix this.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Abandoned)
    }
}
