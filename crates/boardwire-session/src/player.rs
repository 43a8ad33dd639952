//! The local player: whoever sits at this end of the connection.
//!
//! The session never talks to a terminal or picks squares itself. It
//! asks a [`LocalPlayer`] for moves and tells it what happened. That one
//! seam covers a human at a prompt, a bot, and a scripted test double.
//!
//! Two implementations ship here:
//! - [`RandomPlayer`]: uniform random choice among empty squares
//! - any closure `FnMut(&Board, Player) -> Result<Square, SelectionError>`

use boardwire_engine::{Board, Outcome, Player, SelectionError, Square};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The local user-interaction layer of a session.
///
/// Only [`select`](LocalPlayer::select) is required. The notification
/// hooks default to doing nothing.
pub trait LocalPlayer: Send + 'static {
    /// Chooses a square for `role` on `board`.
    ///
    /// Returning a recoverable [`SelectionError`] (or an occupied
    /// square) makes the session call [`rejected`](LocalPlayer::rejected)
    /// and ask again. [`SelectionError::Abandoned`] ends the session.
    fn select(&mut self, board: &Board, role: Player) -> Result<Square, SelectionError>;

    /// The last selection could not be played.
    fn rejected(&mut self, _error: &SelectionError) {}

    /// The peer sent a Text message.
    fn message(&mut self, _text: &str) {}

    /// The peer sent a new authoritative board.
    fn board(&mut self, _board: &Board) {}

    /// The game ended.
    fn finished(&mut self, _board: &Board, _outcome: Outcome) {}
}

impl<F> LocalPlayer for F
where
    F: FnMut(&Board, Player) -> Result<Square, SelectionError>
        + Send
        + 'static,
{
    fn select(&mut self, board: &Board, role: Player) -> Result<Square, SelectionError> {
        self(board, role)
    }
}

// ---------------------------------------------------------------------------
// RandomPlayer
// ---------------------------------------------------------------------------

/// Plays a uniformly random empty square every turn.
///
/// This is what the server plays by default.
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    /// A player seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// A reproducible player for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalPlayer for RandomPlayer {
    fn select(&mut self, board: &Board, _role: Player) -> Result<Square, SelectionError> {
        let empty: Vec<Square> = board.empty_squares().collect();
        if empty.is_empty() {
            return Err(SelectionError::Abandoned);
        }
        Ok(empty[self.rng.random_range(0..empty.len())])
    }

    fn message(&mut self, text: &str) {
        tracing::info!(text, "peer says");
    }

    fn finished(&mut self, _board: &Board, outcome: Outcome) {
        tracing::info!(%outcome, "game finished");
    }
}
