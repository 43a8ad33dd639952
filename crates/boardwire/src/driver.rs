//! Per-connection driver: runs one [`Session`] against one connection.
//!
//! Each connection gets its own Tokio task running [`drive`]. The flow is:
//!   1. Feed `Established` to the session
//!   2. Loop: turn socket reads and write completions into events,
//!      carry out the actions the session returns
//!   3. Stop once the session reaches `Closed`
//!
//! Writes go to a dedicated writer task through an unbounded queue, so a
//! slow peer never stalls reading. The writer sends in order and reports
//! each completion back. A close request is queued like a write, which
//! means everything before it is flushed first.
//!
//! The local player is called synchronously from inside the session and
//! may block (a human at a terminal). On a multi-threaded runtime each
//! step runs under [`tokio::task::block_in_place`] so the worker's other
//! tasks move to another thread while the player thinks.

use std::sync::Arc;

use boardwire_engine::Outcome;
use boardwire_session::{LocalPlayer, Session, SessionAction, SessionEvent, SessionState, WriteId};
use boardwire_transport::{Connection, TransportError};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::BoardwireError;

/// Work for the writer task.
enum WriterCommand {
    Write { id: WriteId, bytes: Vec<u8> },
    Close,
}

/// What the writer task reports back.
enum WriterReport {
    Completed(WriteId),
    Failed(WriteId),
    Closed,
}

/// Plays one game over `conn` and returns how it ended for the local
/// player (`None` if the connection closed before the game did).
///
/// # Errors
/// The session's error if it closed early, otherwise the receive error
/// that cut the connection short.
pub(crate) async fn drive<C, P>(
    conn: C,
    session: Session<P>,
) -> Result<Option<Outcome>, BoardwireError>
where
    C: Connection<Error = TransportError>,
    P: LocalPlayer,
{
    let span = tracing::info_span!("session", conn_id = %conn.id(), role = %session.role());
    run(conn, session).instrument(span).await
}

async fn run<C, P>(conn: C, mut session: Session<P>) -> Result<Option<Outcome>, BoardwireError>
where
    C: Connection<Error = TransportError>,
    P: LocalPlayer,
{
    let conn = Arc::new(conn);
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (report_tx, mut reports) = mpsc::unbounded_channel();
    let writer = tokio::spawn(
        write_loop(Arc::clone(&conn), command_rx, report_tx)
            .in_current_span(),
    );

    let mut reading = true;
    let mut recv_error = None;

    perform(step(&mut session, SessionEvent::Established), &commands);

    while session.state() != SessionState::Closed {
        let event = tokio::select! {
            received = conn.recv(), if reading => match received {
                Ok(Some(chunk)) => {
                    tracing::trace!(len = chunk.len(), "read chunk");
                    SessionEvent::DataArrived(chunk)
                }
                Ok(None) => {
                    tracing::debug!("peer closed the connection");
                    reading = false;
                    SessionEvent::Closed
                }
                Err(e) => {
                    tracing::debug!(error = %e, "recv error");
                    reading = false;
                    recv_error = Some(e);
                    SessionEvent::Closed
                }
            },
            report = reports.recv() => match report {
                Some(WriterReport::Completed(id)) => {
                    SessionEvent::WriteCompleted(id)
                }
                Some(WriterReport::Failed(id)) => SessionEvent::WriteFailed(id),
                // Either our close went through or the writer is gone.
                Some(WriterReport::Closed) | None => SessionEvent::Closed,
            },
        };
        perform(step(&mut session, event), &commands);
    }

    // Let the writer finish whatever is still queued, then feed in the
    // stragglers. The session ignores them now that it is closed.
    drop(commands);
    if let Err(e) = writer.await {
        tracing::debug!(error = %e, "writer task ended abnormally");
    }
    while let Ok(report) = reports.try_recv() {
        if let WriterReport::Completed(id) = report {
            session.handle(SessionEvent::WriteCompleted(id));
        }
    }

    if let Some(e) = session.error() {
        return Err(e.clone().into());
    }
    if let Some(e) = recv_error {
        return Err(e.into());
    }
    Ok(session.outcome())
}

/// Feeds one event to the session, letting the local player block if it
/// needs to.
fn step<P: LocalPlayer>(session: &mut Session<P>, event: SessionEvent) -> Vec<SessionAction> {
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| session.handle(event)),
        // block_in_place panics on a current-thread runtime.
        _ => session.handle(event),
    }
}

/// Hands the session's actions to the writer task.
fn perform(actions: Vec<SessionAction>, commands: &mpsc::UnboundedSender<WriterCommand>) {
    for action in actions {
        let command = match action {
            SessionAction::Write { id, bytes } => {
                WriterCommand::Write { id, bytes }
            }
            SessionAction::Close => WriterCommand::Close,
        };
        if commands.send(command).is_err() {
            // The writer only exits after a close; nothing left to do.
            tracing::trace!("writer already gone");
        }
    }
}

async fn write_loop<C>(
    conn: Arc<C>,
    mut commands: mpsc::UnboundedReceiver<WriterCommand>,
    reports: mpsc::UnboundedSender<WriterReport>,
) where
    C: Connection<Error = TransportError>,
{
    while let Some(command) = commands.recv().await {
        let report = match command {
            WriterCommand::Write { id, bytes } => {
                match conn.send(&bytes).await {
                    Ok(()) => WriterReport::Completed(id),
                    Err(e) => {
                        tracing::debug!(%id, error = %e, "write failed");
                        WriterReport::Failed(id)
                    }
                }
            }
            WriterCommand::Close => {
                if let Err(e) = conn.close().await {
                    tracing::debug!(error = %e, "close failed");
                }
                let _ = reports.send(WriterReport::Closed);
                return;
            }
        };
        if reports.send(report).is_err() {
            return;
        }
    }
}
