//! Integration tests for the Boardwire server, client and full game flow.
//!
//! Servers bind port 0 on loopback so tests never collide. Some tests use
//! a raw `TcpStream` as the client to check the exact bytes on the wire.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use boardwire::prelude::*;
use boardwire::protocol::Reassembler;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

// =========================================================================
// Players and helpers
// =========================================================================

/// Always takes the lowest-numbered empty square.
fn first_empty(board: &Board, _: Player) -> Result<Square, SelectionError> {
    board.empty_squares().next().ok_or(SelectionError::Abandoned)
}

/// Always takes the highest-numbered empty square.
fn last_empty(board: &Board, _: Player) -> Result<Square, SelectionError> {
    board.empty_squares().last().ok_or(SelectionError::Abandoned)
}

/// Plays like `last_empty` and keeps every Text message it receives.
struct Recorder {
    messages: Arc<Mutex<Vec<String>>>,
}

impl LocalPlayer for Recorder {
    fn select(&mut self, board: &Board, role: Player) -> Result<Square, SelectionError> {
        last_empty(board, role)
    }

    fn message(&mut self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Starts a server whose local player is built by `new_player`.
async fn start_server<F, P>(new_player: F) -> String
where
    F: Fn() -> P + Send + Sync + 'static,
    P: LocalPlayer,
{
    start_server_with(SessionConfig::default(), new_player).await
}

/// Like [`start_server`], with every session starting from `config`.
async fn start_server_with<F, P>(config: SessionConfig, new_player: F) -> String
where
    F: Fn() -> P + Send + Sync + 'static,
    P: LocalPlayer,
{
    let server = BoardwireServer::builder()
        .bind("127.0.0.1:0")
        .session_config(config)
        .build(new_player)
        .await
        .expect("server should bind");
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

/// Hands every move decision to another task and blocks until it answers.
struct Remote {
    asks: tokio::sync::mpsc::UnboundedSender<Board>,
    answers: std::sync::mpsc::Receiver<Square>,
}

impl LocalPlayer for Remote {
    fn select(&mut self, board: &Board, _: Player) -> Result<Square, SelectionError> {
        self.asks.send(*board).map_err(|_| SelectionError::Abandoned)?;
        self.answers
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| SelectionError::Abandoned)
    }
}

/// Reads the next frame from a raw stream, or `None` at end of stream.
async fn read_frame(stream: &mut TcpStream, reassembler: &mut Reassembler) -> Option<Frame> {
    let mut buf = [0u8; 512];
    loop {
        if let Some(frame) = reassembler.next_frame().expect("valid frame") {
            return Some(frame);
        }
        let n = timeout(Duration::from_secs(5), stream.read(&mut buf))
            .await
            .expect("server should answer in time")
            .expect("read should succeed");
        if n == 0 {
            return None;
        }
        reassembler.extend(&buf[..n]);
    }
}

fn board(marks: &str) -> Board {
    let mut board = Board::new();
    for (square, mark) in Square::all().zip(marks.chars()) {
        match mark {
            'X' => board.assign_at(square, Player::One),
            'O' => board.assign_at(square, Player::Two),
            _ => {}
        }
    }
    board
}

// =========================================================================
// Wire-level tests
// =========================================================================

#[tokio::test]
async fn test_server_greets_and_answers_center_pick() {
    let addr = start_server(|| first_empty).await;
    let mut stream = TcpStream::connect(&addr).await.unwrap();
    let mut inbound = Reassembler::new();

    // --- Greeting, then the opening board ---
    let greeting = read_frame(&mut stream, &mut inbound).await.unwrap();
    assert_eq!(greeting.kind(), MessageType::Text);
    assert_eq!(greeting.text_lossy(), "Go easy on me, okay?");

    let opening = read_frame(&mut stream, &mut inbound).await.unwrap();
    assert_eq!(opening.board().unwrap(), board("X........"));

    // --- We take the center; exactly two cells are now taken ---
    let mut ours = opening.board().unwrap();
    ours.assign_at(Square::CENTER, Player::Two);
    assert_eq!(ours.empty_squares().count(), 7);
    stream
        .write_all(&Frame::board_state(&ours).encode())
        .await
        .unwrap();

    let reply = read_frame(&mut stream, &mut inbound).await.unwrap();
    assert_eq!(reply.board().unwrap(), board("XX..O...."));
}

#[tokio::test]
async fn test_byte_at_a_time_client_is_understood() {
    let addr = start_server(|| first_empty).await;
    let mut stream = TcpStream::connect(&addr).await.unwrap();
    let mut inbound = Reassembler::new();
    read_frame(&mut stream, &mut inbound).await.unwrap();
    read_frame(&mut stream, &mut inbound).await.unwrap();

    let bytes = Frame::board_state(&board("X.......O")).encode();
    for byte in bytes {
        stream.write_all(&[byte]).await.unwrap();
        stream.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let reply = read_frame(&mut stream, &mut inbound).await.unwrap();
    assert_eq!(reply.board().unwrap(), board("XX......O"));
}

#[tokio::test]
async fn test_garbage_closes_only_that_connection() {
    let addr = start_server(|| first_empty).await;

    let mut bad = TcpStream::connect(&addr).await.unwrap();
    let mut inbound = Reassembler::new();
    read_frame(&mut bad, &mut inbound).await.unwrap();
    read_frame(&mut bad, &mut inbound).await.unwrap();

    // Type tag 9 does not exist.
    bad.write_all(&[9, 0, 0]).await.unwrap();
    assert!(
        read_frame(&mut bad, &mut inbound).await.is_none(),
        "server should close the connection"
    );

    // The listener is still serving other clients.
    let outcome = BoardwireClient::connect(&addr)
        .await
        .unwrap()
        .play(last_empty)
        .await
        .unwrap();
    assert_eq!(outcome, Some(Outcome::Lost));
}

// =========================================================================
// Full games through the client API
// =========================================================================

#[tokio::test]
async fn test_scripted_game_ends_in_defeat_notice() {
    let addr = start_server(|| first_empty).await;
    let messages = Arc::new(Mutex::new(Vec::new()));
    let player = Recorder {
        messages: Arc::clone(&messages),
    };

    // Server: 1, 2, 3. Client: 9, 8. The server completes the top row.
    let outcome = timeout(
        Duration::from_secs(5),
        BoardwireClient::connect(&addr).await.unwrap().play(player),
    )
    .await
    .expect("game should finish")
    .expect("game should end cleanly");

    assert_eq!(outcome, Some(Outcome::Lost));
    assert_eq!(
        *messages.lock().unwrap(),
        ["Go easy on me, okay?", "You lose!"]
    );
}

#[tokio::test]
async fn test_random_games_finish() {
    let addr = start_server(RandomPlayer::new).await;
    for seed in 0..5 {
        let outcome = timeout(
            Duration::from_secs(5),
            BoardwireClient::connect(&addr)
                .await
                .unwrap()
                .play(RandomPlayer::seeded(seed)),
        )
        .await
        .expect("game should finish")
        .expect("game should end cleanly");
        assert!(outcome.is_some(), "seed {seed} ended without a result");
    }
}

#[tokio::test]
async fn test_server_session_config_is_applied() {
    let config = SessionConfig {
        greeting: "Welcome aboard.".into(),
        defeat_notice: "Game over.".into(),
        ..Default::default()
    };
    let addr = start_server_with(config, || first_empty).await;
    let messages = Arc::new(Mutex::new(Vec::new()));
    let player = Recorder {
        messages: Arc::clone(&messages),
    };

    let outcome = BoardwireClient::connect(&addr)
        .await
        .unwrap()
        .play(player)
        .await
        .unwrap();

    assert_eq!(outcome, Some(Outcome::Lost));
    assert_eq!(*messages.lock().unwrap(), ["Welcome aboard.", "Game over."]);
}

#[tokio::test]
async fn test_client_pending_write_limit_is_applied() {
    let addr = start_server(|| first_empty).await;
    let err = BoardwireClient::connect(&addr)
        .await
        .unwrap()
        .session_config(SessionConfig {
            max_pending_writes: Some(0),
            ..Default::default()
        })
        .play(last_empty)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            BoardwireError::Session(SessionError::Backpressure { pending: 0, limit: 0 })
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_client_attempt_cap_is_applied() {
    let addr = start_server(|| first_empty).await;
    // Square 1 holds the server's opening move, so every pick is rejected.
    let stubborn = |_: &Board, _: Player| Square::from_number(1);
    let err = BoardwireClient::connect(&addr)
        .await
        .unwrap()
        .session_config(SessionConfig {
            max_selection_attempts: 2,
            ..Default::default()
        })
        .play(stubborn)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            BoardwireError::Session(SessionError::SelectionExhausted(2))
        ),
        "got {err:?}"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn test_blocking_player_does_not_stall_the_runtime() {
    let addr = start_server(|| first_empty).await;
    let (asks, mut questions) = tokio::sync::mpsc::unbounded_channel();
    let (reply, answers) = std::sync::mpsc::channel();

    // The answering task needs the runtime's only worker while the
    // player blocks waiting for it.
    tokio::spawn(async move {
        while let Some(board) = questions.recv().await {
            let square = last_empty(&board, Player::Two).unwrap();
            if reply.send(square).is_err() {
                break;
            }
        }
    });

    let client = BoardwireClient::connect(&addr).await.unwrap();
    let game = tokio::spawn(client.play(Remote { asks, answers }));
    let outcome = game.await.unwrap().expect("player should get its answers");
    assert_eq!(outcome, Some(Outcome::Lost));
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_server_stops_when_signalled() {
    let server = BoardwireServer::builder()
        .bind("127.0.0.1:0")
        .build(|| first_empty)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap().to_string();
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    let running = tokio::spawn(server.run_until(async {
        stopped.await.ok();
    }));

    // A game that started before the stop keeps going after it.
    let mut stream = TcpStream::connect(&addr).await.unwrap();
    let mut inbound = Reassembler::new();
    read_frame(&mut stream, &mut inbound).await.unwrap();
    let opening = read_frame(&mut stream, &mut inbound).await.unwrap();

    stop.send(()).unwrap();
    timeout(Duration::from_secs(5), running)
        .await
        .expect("server should stop")
        .unwrap()
        .expect("server should stop cleanly");

    let mut ours = opening.board().unwrap();
    ours.assign_at(Square::CENTER, Player::Two);
    stream
        .write_all(&Frame::board_state(&ours).encode())
        .await
        .unwrap();
    let reply = read_frame(&mut stream, &mut inbound).await.unwrap();
    assert_eq!(reply.board().unwrap(), board("XX..O...."));

    // The listener is gone.
    assert!(BoardwireClient::connect(&addr).await.is_err());
}

#[tokio::test]
async fn test_abandoning_client_reports_session_error() {
    let addr = start_server(|| first_empty).await;
    let abandon = |_: &Board, _: Player| -> Result<Square, SelectionError> {
        Err(SelectionError::Abandoned)
    };
    let err = BoardwireClient::connect(&addr)
        .await
        .unwrap()
        .play(abandon)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardwireError::Session(SessionError::Abandoned)));
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let err = BoardwireClient::connect(&addr).await.err().unwrap();
    assert!(matches!(err, BoardwireError::Transport(_)));
}
