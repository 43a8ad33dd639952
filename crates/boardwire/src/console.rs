//! A human player at a terminal.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use boardwire_engine::{Board, Outcome, Player, SelectionError, Square};
use boardwire_session::LocalPlayer;

/// Prompts for a numbered square on `input` and draws the game on
/// `output`.
///
/// ```text
///      X | 2 | 3
///     ---+---+---
///      4 | O | 6
///     ---+---+---
///      7 | 8 | 9
/// ```
///
/// Reading a move blocks the calling thread. Run games with a console
/// player on the multi-threaded runtime so the socket keeps being served
/// while the user types.
pub struct ConsolePlayer<R, W> {
    input: R,
    output: W,
    last_drawn: Option<Board>,
}

impl ConsolePlayer<BufReader<Stdin>, Stdout> {
    /// A player on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsolePlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            last_drawn: None,
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn draw(&mut self, board: &Board) -> io::Result<()> {
        self.last_drawn = Some(*board);
        write!(self.output, "\n{}", render(board))?;
        self.output.flush()
    }

    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.output, "{line}") {
            tracing::debug!(error = %e, "console write failed");
        }
    }
}

impl<R, W> LocalPlayer for ConsolePlayer<R, W>
where
    R: BufRead + Send + 'static,
    W: Write + Send + 'static,
{
    fn select(&mut self, _board: &Board, _role: Player) -> Result<Square, SelectionError> {
        write!(self.output, "\nPick a square: ")
            .and_then(|()| self.output.flush())
            .map_err(|_| SelectionError::Abandoned)?;

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => Err(SelectionError::Abandoned),
            Ok(_) => line.parse(),
        }
    }

    fn rejected(&mut self, error: &SelectionError) {
        match error {
            SelectionError::OutOfRange(_) | SelectionError::Unparsable(_) => {
                self.say("The squares are numbered 1 through 9.");
            }
            SelectionError::Occupied(_) => self.say("That square is occupied."),
            SelectionError::Abandoned => {}
        }
    }

    fn message(&mut self, text: &str) {
        self.say(text);
    }

    fn board(&mut self, board: &Board) {
        if let Err(e) = self.draw(board) {
            tracing::debug!(error = %e, "console write failed");
        }
    }

    fn finished(&mut self, board: &Board, outcome: Outcome) {
        if self.last_drawn != Some(*board) {
            self.board(board);
        }
        self.say(match outcome {
            Outcome::Won => "Congratulations! You're a winner!",
            Outcome::Lost => "Better luck next time.",
            Outcome::Draw => "It's a draw.",
        });
    }
}

/// Draws `board` with empty squares shown by number.
pub fn render(board: &Board) -> String {
    let mut out = String::new();
    for y in 0..3 {
        if y > 0 {
            out.push_str("    ---+---+---\n");
        }
        let cells: Vec<String> = (0..3)
            .map(|x| match board.owner(x, y).player() {
                Some(player) => player.mark().to_string(),
                None => (y * 3 + x + 1).to_string(),
            })
            .collect();
        out.push_str(&format!("     {} \n", cells.join(" | ")));
    }
    out
}
