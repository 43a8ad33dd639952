//! Board coordinates and the 1–9 numbering humans type in.
//!
//! ```text
//!   1 | 2 | 3        (0,0) (1,0) (2,0)
//!  ---+---+---
//!   4 | 5 | 6   ==   (0,1) (1,1) (2,1)
//!  ---+---+---
//!   7 | 8 | 9        (0,2) (1,2) (2,2)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::SelectionError;

/// A validated `(x, y)` position on the board, both in `0..3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    x: u8,
    y: u8,
}

impl Square {
    /// The centre square, number 5.
    pub const CENTER: Square = Square { x: 1, y: 1 };

    /// Returns the square at `(x, y)`, or `None` if either coordinate
    /// is off the board.
    pub fn new(x: usize, y: usize) -> Option<Self> {
        if x < 3 && y < 3 {
            Some(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            None
        }
    }

    /// Converts a human square number (1–9, row-major) to a square.
    ///
    /// # Errors
    /// Returns [`SelectionError::OutOfRange`] for anything outside 1–9.
    pub fn from_number(number: i64) -> Result<Self, SelectionError> {
        if !(1..=9).contains(&number) {
            return Err(SelectionError::OutOfRange(number));
        }
        let index = (number - 1) as u8;
        Ok(Self {
            x: index % 3,
            y: index / 3,
        })
    }

    /// Column, `0..3`.
    pub fn x(self) -> usize {
        self.x as usize
    }

    /// Row, `0..3`.
    pub fn y(self) -> usize {
        self.y as usize
    }

    /// The 1–9 number of this square.
    pub fn number(self) -> u8 {
        self.y * 3 + self.x + 1
    }

    /// All nine squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..9u8).map(|i| Square { x: i % 3, y: i / 3 })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for Square {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number: i64 = trimmed
            .parse()
            .map_err(|_| SelectionError::Unparsable(trimmed.to_string()))?;
        Self::from_number(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_five_is_center() {
        let sq = Square::from_number(5).unwrap();
        assert_eq!((sq.x(), sq.y()), (1, 1));
        assert_eq!(sq, Square::CENTER);
    }

    #[test]
    fn test_numbering_is_row_major() {
        let sq = Square::from_number(3).unwrap();
        assert_eq!((sq.x(), sq.y()), (2, 0));
        let sq = Square::from_number(7).unwrap();
        assert_eq!((sq.x(), sq.y()), (0, 2));
    }

    #[test]
    fn test_number_round_trips_for_every_square() {
        for (i, sq) in Square::all().enumerate() {
            assert_eq!(sq.number() as usize, i + 1);
            assert_eq!(Square::from_number(i as i64 + 1).unwrap(), sq);
        }
    }

    #[test]
    fn test_from_number_rejects_out_of_range() {
        assert_eq!(Square::from_number(0), Err(SelectionError::OutOfRange(0)));
        assert_eq!(Square::from_number(10), Err(SelectionError::OutOfRange(10)));
    }

    #[test]
    fn test_new_rejects_off_board_coordinates() {
        assert!(Square::new(2, 2).is_some());
        assert!(Square::new(3, 0).is_none());
        assert!(Square::new(0, 3).is_none());
    }

    #[test]
    fn test_parse_trims_and_validates() {
        assert_eq!(" 9\n".parse::<Square>().unwrap().number(), 9);
        assert_eq!("-1".parse::<Square>(), Err(SelectionError::OutOfRange(-1)));
        assert_eq!(
            "five".parse::<Square>(),
            Err(SelectionError::Unparsable("five".into()))
        );
    }
}
