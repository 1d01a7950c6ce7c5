mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Perch -- single-post scraper for the bird site.
#[derive(Parser, Debug)]
#[command(name = "perch", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape one post and append it to the log
    Scrape {
        /// URL of the post page
        url: String,

        /// Path of the append-only log file
        #[arg(long, default_value = "log.txt")]
        log: PathBuf,
    },

    /// Print the accumulated log
    Log {
        /// Path of the append-only log file
        #[arg(long, default_value = "log.txt")]
        log: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with env filter (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { url, log } => commands::scrape::run(&url, &log).await,
        Commands::Log { log } => commands::log::run(&log),
    }
}
