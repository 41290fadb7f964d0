use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fieldtrack::cli::{Cli, Command};
use fieldtrack::server::{self, AppState};
use fieldtrack::storage::Storage;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve {
            host,
            port,
            uploads_dir,
            seed,
        } => run_serve(&host, port, uploads_dir, seed).await,
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run_serve(
    host: &str,
    port: u16,
    uploads_dir: PathBuf,
    seed: bool,
) -> fieldtrack::Result<()> {
    std::fs::create_dir_all(&uploads_dir)?;

    let mut storage = Storage::new();
    if seed {
        fieldtrack::seed::seed(&mut storage)?;
        tracing::info!("store populated with demo data");
    }

    let state = AppState::new(storage, uploads_dir);
    server::serve(state, host, port).await
}
