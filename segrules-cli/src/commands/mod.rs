//! CLI command implementations

use crate::error::CliError;
use crate::input::FileReader;
use anyhow::Result;
use clap::Subcommand;
use segrules_core::RuleSet;
use std::path::Path;
use std::sync::Arc;

pub mod generate_config;
pub mod inspect;
pub mod tokenize;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Tokenize text files with a compiled rule table
    Tokenize(tokenize::TokenizeArgs),

    /// Show what a compiled rule table contains
    Inspect(inspect::InspectArgs),

    /// Check that a compiled rule table loads
    Validate(validate::ValidateArgs),

    /// Write a CLI configuration template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Tokenize(args) => args.execute(),
            Commands::Inspect(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                subcommand.execute();
                Ok(())
            }
        }
    }
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List available output formats
    Formats,
}

impl ListCommands {
    /// Print the requested listing
    pub fn execute(&self) {
        match self {
            ListCommands::Formats => {
                println!("Available output formats:");
                println!("  text      One token per line");
                println!("  json      JSON array of inputs with their tokens");
                println!("  markdown  Numbered token list per input");
            }
        }
    }
}

/// Load a rule table from disk into a shareable rule set
pub(crate) fn load_rules(path: &Path) -> Result<Arc<RuleSet>> {
    let bytes = FileReader::read_bytes(path)?;
    let rules = RuleSet::load_shared(&bytes)
        .map_err(|e| CliError::RuleTableError(format!("{}: {e}", path.display())))?;
    log::info!(
        "Loaded rule table {} ({} states, {} categories)",
        path.display(),
        rules.num_states(),
        rules.cat_count()
    );
    Ok(rules)
}
