//! Tic-tac-toe server: plays PlayerOne with random moves against every
//! client that connects.

use boardwire::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Host tic-tac-toe games on loopback.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = 3000)]
    port: u16,
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
    let server = BoardwireServer::builder()
        .bind(&format!("127.0.0.1:{}", args.port))
        .build(RandomPlayer::new)
        .await?;
    tracing::info!(port = args.port, "listening");
    server
        .run_until(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await
}
