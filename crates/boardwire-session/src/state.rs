//! Session lifecycle states and the other small types the state machine
//! is built from.

use std::fmt;

use boardwire_engine::Player;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// Which end of the connection a session sits on.
///
/// The server speaks first: it greets the client and sends the opening
/// board as soon as the connection is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Server,
    Client,
}

impl Endpoint {
    /// The role this endpoint plays unless told otherwise: the server is
    /// PlayerOne, the client PlayerTwo.
    pub fn default_role(self) -> Player {
        match self {
            Self::Server => Player::One,
            Self::Client => Player::Two,
        }
    }

    /// The state a fresh session starts in.
    pub fn initial_state(self) -> SessionState {
        match self {
            Self::Server => SessionState::Accepting,
            Self::Client => SessionState::Connecting,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The lifecycle of one connection.
///
/// ```text
/// Connecting ─┐
///             ├→ Established → Exchanging → GameOver → Closing → Closed
/// Accepting ──┘        │            │                    ↑
///                      └────────────┴── error / EOF ─────┘
/// ```
///
/// - **Connecting / Accepting**: transport not up yet (client / server).
/// - **Established**: connected; the server has sent its greeting and
///   opening board.
/// - **Exchanging**: at least one move has been sent; waiting for the
///   opponent's board.
/// - **GameOver**: somebody won or the board filled up. Passed through
///   immediately on the way to `Closing`.
/// - **Closing**: no more inbound frames are processed; queued writes
///   are flushed, then the transport is closed.
/// - **Closed**: the transport is gone. Late write completions are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Connecting,
    Accepting,
    Established,
    Exchanging,
    GameOver,
    Closing,
    Closed,
}

impl SessionState {
    /// `true` while inbound frames are still processed.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            Self::Connecting
                | Self::Accepting
                | Self::Established
                | Self::Exchanging
        )
    }

    /// `true` while a BoardState frame is a legal thing to receive.
    pub fn accepts_board(&self) -> bool {
        matches!(self, Self::Established | Self::Exchanging)
    }

    /// Returns `true` if moving to `target` is a legal transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        use SessionState::*;
        match (self, target) {
            (Connecting | Accepting, Established) => true,
            (Established, Exchanging | GameOver) => true,
            (Exchanging, GameOver) => true,
            (GameOver, Closing) => true,
            (Closing, Closed) => true,
            // Errors and EOF can cut any open state short.
            (from, Closing) => from.is_open(),
            _ => false,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Accepting => write!(f, "Accepting"),
            Self::Established => write!(f, "Established"),
            Self::Exchanging => write!(f, "Exchanging"),
            Self::GameOver => write!(f, "GameOver"),
            Self::Closing => write!(f, "Closing"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Events and actions
// ---------------------------------------------------------------------------

/// Identifies one queued write so its completion can be matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteId(pub u64);

impl fmt::Display for WriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w-{}", self.0)
    }
}

/// Something the transport did that the session needs to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The connect or accept finished.
    Established,
    /// A chunk of bytes arrived. It may hold any part of any number of
    /// frames.
    DataArrived(Vec<u8>),
    /// A queued write reached the transport.
    WriteCompleted(WriteId),
    /// A queued write failed.
    WriteFailed(WriteId),
    /// End of stream, a read error, or the close we asked for finished.
    Closed,
}

/// Something the session wants the transport to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Queue these bytes for sending. Report back with `WriteCompleted`.
    Write { id: WriteId, bytes: Vec<u8> },
    /// Close the connection once every queued write has gone out.
    Close,
}
