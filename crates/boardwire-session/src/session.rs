//! The per-connection state machine.
//!
//! A [`Session`] never touches a socket. The driver feeds it
//! [`SessionEvent`]s as the transport reports them and carries out the
//! [`SessionAction`]s it returns. Everything the local user should see or
//! decide goes through the session's [`LocalPlayer`].
//!
//! ```text
//!   transport ──SessionEvent──→ Session ──SessionAction──→ transport
//!                                  │
//!                                  ↕
//!                             LocalPlayer
//! ```
//!
//! Because nothing here is async, the whole game can be tested by
//! handing bytes from one session to another in memory.

use std::collections::HashSet;

use boardwire_engine::{Board, Cell, Outcome, Player, SelectionError, Square};
use boardwire_protocol::{Frame, MessageType, Reassembler};

use crate::{
    Endpoint, LocalPlayer, SessionAction, SessionConfig, SessionError,
    SessionEvent, SessionState, WriteId,
};

/// One side of one game.
pub struct Session<P: LocalPlayer> {
    endpoint: Endpoint,
    role: Player,
    state: SessionState,
    config: SessionConfig,
    player: P,

    /// The last authoritative board, plus our own move once made.
    board: Board,

    /// Receive-side accumulator. Holds partial frames between chunks.
    inbound: Reassembler,

    /// Writes handed to the transport that have not completed yet.
    pending: HashSet<WriteId>,
    next_write: u64,

    outcome: Option<Outcome>,
    error: Option<SessionError>,
}

impl<P: LocalPlayer> Session<P> {
    /// Creates a session for `endpoint`, playing `role`.
    pub fn new(endpoint: Endpoint, role: Player, player: P, config: SessionConfig) -> Self {
        Self {
            endpoint,
            role,
            state: endpoint.initial_state(),
            config,
            player,
            board: Board::new(),
            inbound: Reassembler::new(),
            pending: HashSet::new(),
            next_write: 0,
            outcome: None,
            error: None,
        }
    }

    /// A listening-side session playing PlayerOne.
    pub fn server(player: P, config: SessionConfig) -> Self {
        Self::new(
            Endpoint::Server,
            Endpoint::Server.default_role(),
            player,
            config,
        )
    }

    /// A connecting-side session playing PlayerTwo.
    pub fn client(player: P, config: SessionConfig) -> Self {
        Self::new(
            Endpoint::Client,
            Endpoint::Client.default_role(),
            player,
            config,
        )
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn role(&self) -> Player {
        self.role
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// How the game ended for the local player, once it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The error that closed the session, if one did.
    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    /// Number of writes still waiting for a completion.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn into_player(self) -> P {
        self.player
    }

    /// Processes one transport event and returns what to do about it.
    ///
    /// Errors never escape: a fatal one is recorded (see
    /// [`error`](Session::error)) and turned into a `Close` action.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        let mut actions = Vec::new();
        if let Err(e) = self.step(event, &mut actions) {
            self.fail(e, &mut actions);
        }
        actions
    }

    fn step(
        &mut self,
        event: SessionEvent,
        actions: &mut Vec<SessionAction>,
    ) -> Result<(), SessionError> {
        match event {
            SessionEvent::Established => self.on_established(actions),
            SessionEvent::DataArrived(bytes) => self.on_data(&bytes, actions),
            SessionEvent::WriteCompleted(id) => {
                self.on_write_completed(id);
                Ok(())
            }
            SessionEvent::WriteFailed(id) => {
                if self.state == SessionState::Closed
                    || !self.pending.remove(&id)
                {
                    return Ok(());
                }
                Err(SessionError::Transport(format!("write {id} failed")))
            }
            SessionEvent::Closed => {
                self.on_closed();
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn on_established(&mut self, actions: &mut Vec<SessionAction>) -> Result<(), SessionError> {
        if !matches!(
            self.state,
            SessionState::Connecting | SessionState::Accepting
        ) {
            tracing::debug!(state = %self.state, "ignoring repeated establish");
            return Ok(());
        }
        self.transition(SessionState::Established);
        tracing::info!(endpoint = ?self.endpoint, role = %self.role, "connection established");

        if self.endpoint == Endpoint::Server {
            let greeting = Frame::text(self.config.greeting.as_str())?;
            self.queue(greeting.encode(), actions)?;

            if self.config.opening_move {
                let square = self.select_move()?;
                self.board.assign_at(square, self.role);
            }
            self.queue(Frame::board_state(&self.board).encode(), actions)?;
        }
        Ok(())
    }

    fn on_data(
        &mut self,
        bytes: &[u8],
        actions: &mut Vec<SessionAction>,
    ) -> Result<(), SessionError> {
        if !self.state.is_open() {
            tracing::trace!(len = bytes.len(), state = %self.state, "dropping late data");
            return Ok(());
        }
        self.inbound.extend(bytes);

        // A frame can end the game, after which the rest is ignored.
        while self.state.is_open() {
            match self.inbound.next_frame()? {
                Some(frame) => self.dispatch(frame, actions)?,
                None => break,
            }
        }
        Ok(())
    }

    fn dispatch(
        &mut self,
        frame: Frame,
        actions: &mut Vec<SessionAction>,
    ) -> Result<(), SessionError> {
        tracing::debug!(kind = %frame.kind(), len = frame.payload().len(), "frame received");
        match frame.kind() {
            MessageType::Text => {
                self.player.message(&frame.text_lossy());
                Ok(())
            }
            MessageType::BoardState => {
                if !self.state.accepts_board() {
                    return Err(SessionError::UnexpectedFrame {
                        kind: MessageType::BoardState,
                        state: self.state,
                    });
                }
                let board = frame.board()?;
                self.on_board(board, actions)
            }
        }
    }

    fn on_board(
        &mut self,
        board: Board,
        actions: &mut Vec<SessionAction>,
    ) -> Result<(), SessionError> {
        self.board = board;
        self.player.board(&self.board);

        if self.board.is_over() {
            // The opponent's move ended it; nothing left to play.
            return self.finish(actions);
        }

        let square = self.select_move()?;
        self.board.assign_at(square, self.role);

        if self.board.winner() == Cell::from(self.role) {
            let notice = Frame::text(self.config.defeat_notice.as_str())?;
            self.queue(notice.encode(), actions)?;
            self.queue(Frame::board_state(&self.board).encode(), actions)?;
            return self.finish(actions);
        }

        self.queue(Frame::board_state(&self.board).encode(), actions)?;
        if self.board.is_over() {
            return self.finish(actions);
        }
        if self.state == SessionState::Established {
            self.transition(SessionState::Exchanging);
        }
        Ok(())
    }

    fn on_write_completed(&mut self, id: WriteId) {
        if self.state == SessionState::Closed {
            tracing::trace!(%id, "write completed after close");
            return;
        }
        if self.pending.remove(&id) {
            tracing::trace!(%id, pending = self.pending.len(), "write completed");
        } else {
            tracing::debug!(%id, "completion for unknown write");
        }
    }

    fn on_closed(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if self.state != SessionState::Closing {
            self.transition(SessionState::Closing);
        }
        self.transition(SessionState::Closed);
        self.pending.clear();
        tracing::info!(
            endpoint = ?self.endpoint,
            outcome = ?self.outcome,
            "session closed"
        );
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Asks the local player for a square until it names an empty one.
    fn select_move(&mut self) -> Result<Square, SessionError> {
        let mut attempts = 0;
        loop {
            let rejection = match self.player.select(&self.board, self.role) {
                Ok(square) if self.board.owner_at(square).is_empty() => {
                    tracing::debug!(%square, role = %self.role, "move selected");
                    return Ok(square);
                }
                Ok(square) => SelectionError::Occupied(square),
                Err(e) if e.is_recoverable() => e,
                Err(_) => return Err(SessionError::Abandoned),
            };

            attempts += 1;
            tracing::debug!(error = %rejection, attempts, "selection rejected");
            self.player.rejected(&rejection);
            if attempts >= self.config.max_selection_attempts {
                return Err(SessionError::SelectionExhausted(attempts));
            }
        }
    }

    fn queue(
        &mut self,
        bytes: Vec<u8>,
        actions: &mut Vec<SessionAction>,
    ) -> Result<(), SessionError> {
        if let Some(limit) = self.config.max_pending_writes {
            if self.pending.len() >= limit {
                return Err(SessionError::Backpressure {
                    pending: self.pending.len(),
                    limit,
                });
            }
        }
        let id = WriteId(self.next_write);
        self.next_write += 1;
        self.pending.insert(id);
        actions.push(SessionAction::Write { id, bytes });
        Ok(())
    }

    fn finish(&mut self, actions: &mut Vec<SessionAction>) -> Result<(), SessionError> {
        self.transition(SessionState::GameOver);
        if let Some(outcome) = self.board.outcome_for(self.role) {
            tracing::info!(role = %self.role, %outcome, "game over");
            self.outcome = Some(outcome);
            self.player.finished(&self.board, outcome);
        }
        self.begin_closing(actions);
        Ok(())
    }

    fn begin_closing(&mut self, actions: &mut Vec<SessionAction>) {
        self.transition(SessionState::Closing);
        actions.push(SessionAction::Close);
    }

    fn fail(&mut self, error: SessionError, actions: &mut Vec<SessionAction>) {
        tracing::warn!(error = %error, state = %self.state, "session failed");
        if self.error.is_none() {
            self.error = Some(error);
        }
        if self.state.is_open() {
            self.begin_closing(actions);
        }
    }

    fn transition(&mut self, target: SessionState) {
        debug_assert!(
            self.state.can_transition_to(target),
            "illegal transition {} -> {}",
            self.state,
            target
        );
        tracing::debug!(from = %self.state, to = %target, "state transition");
        self.state = target;
    }
}
