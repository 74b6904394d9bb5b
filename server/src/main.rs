//! structura-server: serves the API, or loads fixture data with `seed`.
//!
//! Run from repo root: `cargo run -p structura-server` (or `... -- seed --reset`).

use clap::{Parser, Subcommand};
use structura_api::{app, connect, seed, AppConfig, AppState};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "structura-server", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Upsert the known users and machines.
    Seed {
        /// Delete all users and machines first.
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("structura_api=info,structura_server=info,tower_http=info")
            }),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let pool = connect(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Seed { reset } => {
            let report = seed::run(&pool, reset).await?;
            println!("Seed done: {} users, {} machines.", report.users, report.machines);
        }
        Command::Serve => {
            let addr = config.bind_addr();
            let router = app(AppState::new(pool, config));
            let listener = TcpListener::bind(&addr).await?;
            tracing::info!("structura-server listening on http://{}", listener.local_addr()?);
            axum::serve(listener, router).await?;
        }
    }
    Ok(())
}
