//! The connecting side.

use std::net::SocketAddr;

use boardwire_engine::Outcome;
use boardwire_session::{LocalPlayer, Session, SessionConfig};
use boardwire_transport::{Connection, TcpConnection};

use crate::BoardwireError;
use crate::driver::drive;

/// A connection to a Boardwire server, ready to play one game as
/// PlayerTwo.
///
/// ```rust,ignore
/// let outcome = BoardwireClient::connect("127.0.0.1:3000")
///     .await?
///     .play(ConsolePlayer::stdio())
///     .await?;
/// ```
pub struct BoardwireClient {
    conn: TcpConnection,
    session_config: SessionConfig,
}

impl BoardwireClient {
    /// Connects to `addr` (`host:port`).
    pub async fn connect(addr: &str) -> Result<Self, BoardwireError> {
        let conn = TcpConnection::connect(addr).await?;
        tracing::info!(conn_id = %conn.id(), addr, "connected");
        Ok(Self {
            conn,
            session_config: SessionConfig::default(),
        })
    }

    /// Replaces the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.conn.peer_addr()
    }

    /// Plays until the game ends or the connection drops.
    ///
    /// Returns the outcome for `player`, or `None` if the server went
    /// away before the game finished.
    pub async fn play<P: LocalPlayer>(self, player: P) -> Result<Option<Outcome>, BoardwireError> {
        let session = Session::client(player, self.session_config);
        drive(self.conn, session).await
    }
}
