//! segrules command-line entry point

use clap::Parser;
use segrules_cli::commands::Commands;

/// Tokenize text with compiled segmentation rule tables
#[derive(Debug, Parser)]
#[command(name = "segrules", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    Cli::parse().command.execute()
}
