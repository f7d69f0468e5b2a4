//! pacsearch CLI - Command-line interface
//!
//! Commands:
//! - play: Play maze games with a search agent
//! - compare: Compare the search policies on one position

mod compare_cmd;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pacsearch")]
#[command(about = "Adversarial game-tree search in a maze")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play games with a search agent against random opponents
    Play(play_cmd::PlayArgs),
    /// Run every policy on one position and compare results
    Compare(compare_cmd::CompareArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Compare(args) => compare_cmd::run(args, cli.seed),
    }
}
