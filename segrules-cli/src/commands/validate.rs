//! Validate command implementation

use crate::input::FileReader;
use anyhow::Result;
use clap::Args;
use segrules_core::RuleSet;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Compiled rule table to validate
    #[arg(short, long, value_name = "FILE", required = true)]
    pub rules: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating rule table: {}", self.rules.display());

        let bytes = FileReader::read_bytes(&self.rules)?;
        match RuleSet::from_bytes(&bytes) {
            Ok(rules) => {
                println!("✓ Rule table is valid!");
                println!("  States: {}", rules.num_states());
                println!("  Categories: {}", rules.cat_count());
                Ok(())
            }
            Err(e) => {
                println!("✗ Rule table is invalid!");
                println!("  Error: {e}");
                Err(anyhow::anyhow!("Validation failed: {}", e))
            }
        }
    }
}
