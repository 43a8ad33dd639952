//! Error types for the session layer.

use boardwire_protocol::{MessageType, ProtocolError};

use crate::SessionState;

/// Why a session was closed early.
///
/// Every variant is fatal for its connection and only for its
/// connection. Recoverable problems (a typo at the move prompt, an
/// occupied square) never reach this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The byte stream or a frame in it was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A well-formed frame arrived at a point in the exchange where it
    /// makes no sense, e.g. a board before the connection was up.
    #[error("unexpected {kind} frame while {state}")]
    UnexpectedFrame {
        kind: MessageType,
        state: SessionState,
    },

    /// The local player kept choosing unplayable squares.
    #[error("no playable square selected after {0} attempts")]
    SelectionExhausted(u32),

    /// The local player stopped choosing moves.
    #[error("local player abandoned the game")]
    Abandoned,

    /// Too many writes queued without completing.
    #[error("{pending} writes pending, limit is {limit}")]
    Backpressure { pending: usize, limit: usize },

    /// The transport reported a failed write.
    #[error("transport failure: {0}")]
    Transport(String),
}
