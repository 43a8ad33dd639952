//! Per-connection game sessions for Boardwire.
//!
//! A [`Session`] is the state machine behind one connection. It turns
//! transport events (bytes arrived, write finished, stream closed) into
//! transport actions (write these bytes, close), and it asks its
//! [`LocalPlayer`] whenever a move is needed.
//!
//! # How it fits in the stack
//!
//! ```text
//! Runner (above)  ← owns the socket, drives the session with events
//!     ↕
//! Session Layer (this crate)  ← lifecycle, turn taking, win detection
//!     ↕
//! Protocol Layer (below)  ← frames and reassembly
//! ```
//!
//! Nothing in this crate performs I/O, so games can be played end to end
//! in plain unit tests.

mod config;
mod error;
mod player;
mod session;
mod state;

pub use config::SessionConfig;
pub use error::SessionError;
pub use player::{LocalPlayer, RandomPlayer};
pub use session::Session;
pub use state::{Endpoint, SessionAction, SessionEvent, SessionState, WriteId};
