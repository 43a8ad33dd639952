//! `BoardwireServer` builder and accept loop.
//!
//! This is the entry point for hosting games. It ties the layers
//! together: transport → protocol → session, one session per accepted
//! connection.

use std::net::SocketAddr;
use std::sync::Arc;

use boardwire_session::{LocalPlayer, Session, SessionConfig};
use boardwire_transport::{Connection, TcpConnection, TcpTransport, Transport, TransportError};

use crate::BoardwireError;
use crate::driver::drive;

/// Default listening address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Builder for configuring and starting a Boardwire server.
///
/// # Example
///
/// ```rust,ignore
/// use boardwire::prelude::*;
///
/// let server = BoardwireServer::builder()
///     .bind("127.0.0.1:3000")
///     .build(RandomPlayer::new)
///     .await?;
/// server.run().await
/// ```
pub struct BoardwireServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
}

impl BoardwireServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_config: SessionConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every session starts with.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Binds the listener.
    ///
    /// `new_player` is called once per accepted connection to create the
    /// local player for that game.
    pub async fn build<F, P>(self, new_player: F) -> Result<BoardwireServer<F>, BoardwireError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: LocalPlayer,
    {
        let transport = TcpTransport::bind(&self.bind_addr).await?;
        Ok(BoardwireServer {
            transport,
            session_config: Arc::new(self.session_config),
            new_player,
        })
    }
}

impl Default for BoardwireServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Boardwire server.
///
/// Call [`run()`](Self::run) or [`run_until()`](Self::run_until) to start
/// accepting connections.
pub struct BoardwireServer<F> {
    transport: TcpTransport,
    session_config: Arc<SessionConfig>,
    new_player: F,
}

impl BoardwireServer<()> {
    /// Creates a new builder.
    pub fn builder() -> BoardwireServerBuilder {
        BoardwireServerBuilder::new()
    }
}

impl<F, P> BoardwireServer<F>
where
    F: Fn() -> P + Send + Sync + 'static,
    P: LocalPlayer,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process exits.
    ///
    /// Each accepted connection gets its own task and its own session.
    /// A failed accept is logged and the loop carries on.
    pub async fn run(self) -> Result<(), BoardwireError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `signal` completes, then shuts the
    /// transport down and returns.
    ///
    /// Games already in progress keep running on their own tasks.
    pub async fn run_until<S>(mut self, signal: S) -> Result<(), BoardwireError>
    where
        S: Future<Output = ()> + Send,
    {
        tracing::info!(addr = ?self.local_addr().ok(), "Boardwire server running");
        tokio::pin!(signal);

        loop {
            let accepted = tokio::select! {
                accepted = self.transport.accept() => accepted,
                () = &mut signal => break,
            };
            match accepted {
                Ok(conn) => self.spawn_session(conn),
                Err(TransportError::Shutdown) => break,
                Err(e) => tracing::error!(error = %e, "accept failed"),
            }
        }

        self.transport.shutdown().await?;
        tracing::info!("Boardwire server stopped");
        Ok(())
    }

    fn spawn_session(&self, conn: TcpConnection) {
        let conn_id = conn.id();
        tracing::info!(%conn_id, peer = %conn.peer_addr(), "connection accepted");
        let session = Session::server((self.new_player)(), (*self.session_config).clone());
        tokio::spawn(async move {
            match drive(conn, session).await {
                Ok(outcome) => {
                    tracing::info!(%conn_id, ?outcome, "connection finished");
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "connection ended with error");
                }
            }
        });
    }
}
