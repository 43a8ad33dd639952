//! Unified error type for Boardwire.

use boardwire_session::SessionError;
use boardwire_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically. Frame and board
/// errors reach this level inside [`SessionError::Protocol`].
#[derive(Debug, thiserror::Error)]
pub enum BoardwireError {
    /// Binding, accepting, connecting, sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session closed early (bad frame, abandoned game, ...).
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use boardwire_protocol::ProtocolError;

    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("conn-7".into());
        let boardwire_err: BoardwireError = err.into();
        assert!(matches!(boardwire_err, BoardwireError::Transport(_)));
        assert_eq!(boardwire_err.to_string(), "connection closed: conn-7");
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Abandoned;
        let boardwire_err: BoardwireError = err.into();
        assert!(matches!(boardwire_err, BoardwireError::Session(_)));
    }

    #[test]
    fn test_protocol_error_surfaces_through_session() {
        let err = SessionError::from(ProtocolError::InvalidType(9));
        let boardwire_err: BoardwireError = err.into();
        assert!(matches!(
            boardwire_err,
            BoardwireError::Session(SessionError::Protocol(_))
        ));
        assert_eq!(boardwire_err.to_string(), "unknown message type 9");
    }
}
