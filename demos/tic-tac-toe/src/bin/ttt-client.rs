//! Tic-tac-toe client: connects to a server and plays PlayerTwo.

use boardwire::prelude::*;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Who makes the client's moves.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Opponent {
    /// Prompt on stdin
    Console,
    /// Pick random empty squares
    Random,
}

/// Play tic-tac-toe against a Boardwire server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server host
    #[arg(default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(default_value_t = 3000)]
    port: u16,

    /// Who plays this side
    #[arg(long, value_enum, default_value_t = Opponent::Console)]
    opponent: Opponent,
}

#[tokio::main]
async fn main() -> Result<(), BoardwireError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    tracing::info!(%addr, "connecting");

    let client = BoardwireClient::connect(&addr).await?;
    let outcome = match args.opponent {
        Opponent::Console => client.play(ConsolePlayer::stdio()).await?,
        Opponent::Random => client.play(RandomPlayer::new()).await?,
    };
    tracing::info!(?outcome, "connection closed");
    Ok(())
}
