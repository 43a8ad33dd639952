//! Session configuration.

use serde::{Deserialize, Serialize};

/// Configuration for session behavior.
///
/// Every field has a sensible default, so the usual way to build one is
/// `SessionConfig { opening_move: false, ..Default::default() }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Text the server sends as soon as a client connects.
    pub greeting: String,

    /// Text sent to the opponent right before the winning board.
    pub defeat_notice: String,

    /// Whether the server's opening board already carries its first
    /// move. When `false` the client opens on an empty board.
    pub opening_move: bool,

    /// Consecutive unplayable selections (occupied square, typo, ...)
    /// tolerated before the session gives up on the local player.
    pub max_selection_attempts: u32,

    /// Upper bound on writes queued without a completion. `None` means
    /// unbounded.
    pub max_pending_writes: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: "Go easy on me, okay?".to_string(),
            defeat_notice: "You lose!".to_string(),
            opening_move: true,
            max_selection_attempts: 64,
            max_pending_writes: None,
        }
    }
}
