//! Encoding and decoding of single frames.
//!
//! ```text
//! byte 0     : MessageType (0 = Text, 1 = BoardState)
//! bytes 1–2  : u16 payload length, big-endian
//! bytes 3..  : payload
//! ```
//!
//! [`decode`] looks at exactly one frame at the start of a buffer and
//! reports how many bytes it used. Looping over a stream is the
//! [`Reassembler`](crate::Reassembler)'s job.

use bytes::Bytes;

use crate::{Frame, MessageType, ProtocolError};

/// Type tag plus length field.
pub const HEADER_LEN: usize = 3;

/// The largest payload the 16-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Result of a successful [`decode`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A whole frame sat at the front of the buffer.
    Frame {
        frame: Frame,
        /// Header plus payload bytes, i.e. `3 + length`.
        consumed: usize,
    },
    /// The buffer ends before the frame does. Nothing was consumed.
    NeedMoreData,
}

/// Encodes one frame: tag, big-endian length, payload.
///
/// # Errors
/// [`ProtocolError::PayloadTooLarge`] if `payload` is longer than 65535
/// bytes. It is never silently truncated.
pub fn encode(kind: MessageType, payload: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge(payload.len()));
    }
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    write_header(kind, payload.len() as u16, &mut out);
    out.extend_from_slice(payload);
    Ok(out)
}

pub(crate) fn write_header(kind: MessageType, len: u16, out: &mut Vec<u8>) {
    out.push(kind.tag());
    out.extend_from_slice(&len.to_be_bytes());
}

/// Tries to parse one frame starting at offset 0 of `buf`.
///
/// The type tag is checked as soon as it is available. An unknown tag
/// fails right away, even before the payload has fully arrived.
///
/// # Errors
/// [`ProtocolError::InvalidType`] for an unknown tag.
pub fn decode(buf: &[u8]) -> Result<Decoded, ProtocolError> {
    if buf.len() < HEADER_LEN {
        return Ok(Decoded::NeedMoreData);
    }

    let kind = MessageType::try_from(buf[0])?;
    let len = u16::from_be_bytes([buf[1], buf[2]]) as usize;
    let consumed = HEADER_LEN + len;

    if buf.len() < consumed {
        return Ok(Decoded::NeedMoreData);
    }

    let payload = Bytes::copy_from_slice(&buf[HEADER_LEN..consumed]);
    Ok(Decoded::Frame {
        frame: Frame::from_parts(kind, payload),
        consumed,
    })
}
