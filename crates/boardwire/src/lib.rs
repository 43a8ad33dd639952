//! # Boardwire
//!
//! Turn-based tic-tac-toe over a typed, length-prefixed TCP protocol.
//!
//! Every message on the wire is a one-byte type tag, a big-endian `u16`
//! length and a payload. Two types exist: free-form Text and a 3-byte
//! BoardState snapshot. The server greets the client, opens the board,
//! and from then on each side answers the other's board with its own
//! move until somebody wins or the board fills up.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boardwire::prelude::*;
//!
//! # async fn demo() -> Result<(), BoardwireError> {
//! let server = BoardwireServer::builder()
//!     .bind("127.0.0.1:3000")
//!     .build(RandomPlayer::new)
//!     .await?;
//! tokio::spawn(server.run());
//!
//! let outcome = BoardwireClient::connect("127.0.0.1:3000")
//!     .await?
//!     .play(RandomPlayer::new())
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

mod client;
mod console;
mod driver;
mod error;
mod server;

pub use client::BoardwireClient;
pub use console::{ConsolePlayer, render};
pub use error::BoardwireError;
pub use server::{BoardwireServer, BoardwireServerBuilder, DEFAULT_BIND_ADDR};

pub use boardwire_engine as engine;
pub use boardwire_protocol as protocol;
pub use boardwire_session as session;
pub use boardwire_transport as transport;

/// Everything needed to host or join a game.
pub mod prelude {
    pub use crate::{
        BoardwireClient, BoardwireError, BoardwireServer,
        BoardwireServerBuilder, ConsolePlayer,
    };
    pub use boardwire_engine::{Board, Cell, Outcome, Player, SelectionError, Square};
    pub use boardwire_protocol::{Frame, MessageType, ProtocolError};
    pub use boardwire_session::{LocalPlayer, RandomPlayer, SessionConfig, SessionError};
    pub use boardwire_transport::TransportError;
}
