//! casepoll commands: `poll` runs a range of lookups and reports on them,
//! `taxonomy` lists the headings and failure markers the classifier knows.

mod poll;
mod taxonomy;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use poll::PollArgs;

#[derive(Parser)]
#[command(name = "casepoll")]
#[command(about = "Batched case status poller")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, global = true, env = "CASEPOLL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a range of case identifiers and report their statuses
    Poll(PollArgs),

    /// List the status headings and failure markers the classifier knows
    Taxonomy,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Poll(args) => poll::cmd_poll(settings, args).await,
        Commands::Taxonomy => taxonomy::cmd_taxonomy(),
    }
}
