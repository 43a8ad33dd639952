//! Wire protocol for Boardwire.
//!
//! This crate defines how messages look on a byte stream:
//!
//! - **Frames** ([`Frame`], [`MessageType`]): a one-byte type tag, a
//!   big-endian `u16` length and the payload. Exactly two kinds exist:
//!   Text and BoardState.
//! - **Codec** ([`encode`], [`decode`]): one frame to or from bytes.
//! - **Reassembly** ([`Reassembler`]): turning arbitrarily split stream
//!   chunks back into whole frames.
//! - **Errors** ([`ProtocolError`]): everything that makes a stream
//!   unusable.
//!
//! # Architecture
//!
//! ```text
//! Transport (chunks) → Reassembler → Frame → Session (board, turns)
//! ```
//!
//! Nothing here touches sockets. The crate is fed bytes and produces
//! frames, so it can be tested without a network.

mod codec;
mod error;
mod frame;
mod reassembler;

pub use codec::{decode, encode, Decoded, HEADER_LEN, MAX_PAYLOAD_LEN};
pub use error::ProtocolError;
pub use frame::{Frame, MessageType};
pub use reassembler::{Frames, Reassembler};
