//! Error types for the protocol layer.
//!
//! Every variant here is fatal for the connection that produced it: the
//! session moves to `Closing` and the peer is disconnected. An incomplete
//! frame is NOT an error. The reassembler keeps those bytes until the
//! rest arrives.

use boardwire_engine::BoardError;

use crate::MessageType;

/// Errors that can occur while framing or unframing messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The type tag is neither Text (0) nor BoardState (1).
    ///
    /// There is no way to find the next frame boundary after this, so
    /// the rest of the stream is unusable.
    #[error("unknown message type {0}")]
    InvalidType(u8),

    /// A payload does not fit the 16-bit length field.
    #[error("payload of {0} bytes exceeds the 65535 byte limit")]
    PayloadTooLarge(usize),

    /// A BoardState payload was not a legal 3-byte board.
    #[error("malformed board state: {0}")]
    MalformedBoard(#[from] BoardError),

    /// A frame of one kind was read as another.
    #[error("expected a {expected} frame, got {actual}")]
    WrongKind {
        expected: MessageType,
        actual: MessageType,
    },
}
