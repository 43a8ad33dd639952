//! The two message kinds and the [`Frame`] that carries them.

use std::borrow::Cow;
use std::fmt;

use boardwire_engine::Board;
use bytes::Bytes;

use crate::codec::{self, MAX_PAYLOAD_LEN};
use crate::ProtocolError;

// ---------------------------------------------------------------------------
// MessageType
// ---------------------------------------------------------------------------

/// The one-byte type tag at the start of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Free-form, human-readable bytes.
    Text = 0,
    /// A full 3-byte board snapshot.
    BoardState = 1,
}

impl MessageType {
    /// The tag as written on the wire.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::Text),
            1 => Ok(Self::BoardState),
            other => Err(ProtocolError::InvalidType(other)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "Text"),
            Self::BoardState => write!(f, "BoardState"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One complete, type-tagged message.
///
/// The length field is not stored: it is always `payload.len()`, which
/// the constructors keep within `u16` range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: MessageType,
    payload: Bytes,
}

impl Frame {
    /// Builds a frame, checking that the payload fits the length field.
    ///
    /// # Errors
    /// [`ProtocolError::PayloadTooLarge`] above 65535 bytes.
    pub fn new(kind: MessageType, payload: impl Into<Bytes>) -> Result<Self, ProtocolError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::PayloadTooLarge(payload.len()));
        }
        Ok(Self { kind, payload })
    }

    /// A Text frame carrying `text` as UTF-8.
    ///
    /// # Errors
    /// [`ProtocolError::PayloadTooLarge`] above 65535 bytes.
    pub fn text(text: impl Into<String>) -> Result<Self, ProtocolError> {
        Self::new(MessageType::Text, text.into().into_bytes())
    }

    /// A BoardState frame for `board`. Always exactly 3 payload bytes.
    pub fn board_state(board: &Board) -> Self {
        Self {
            kind: MessageType::BoardState,
            payload: Bytes::copy_from_slice(&board.to_wire()),
        }
    }

    /// Used by the decoder, which already knows the length fits.
    pub(crate) fn from_parts(kind: MessageType, payload: Bytes) -> Self {
        Self { kind, payload }
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Size of this frame on the wire, header included.
    pub fn encoded_len(&self) -> usize {
        codec::HEADER_LEN + self.payload.len()
    }

    /// Encodes the frame into a fresh buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        codec::write_header(self.kind, self.payload.len() as u16, &mut out);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Reads a BoardState payload as a board.
    ///
    /// # Errors
    /// [`ProtocolError::WrongKind`] for a Text frame,
    /// [`ProtocolError::MalformedBoard`] if the payload is not a legal board.
    pub fn board(&self) -> Result<Board, ProtocolError> {
        if self.kind != MessageType::BoardState {
            return Err(ProtocolError::WrongKind {
                expected: MessageType::BoardState,
                actual: self.kind,
            });
        }
        Ok(Board::from_wire(&self.payload)?)
    }

    /// The payload as text, replacing invalid UTF-8.
    pub fn text_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
