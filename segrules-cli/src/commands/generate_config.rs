//! Generate config command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path for the configuration
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        std::fs::write(&self.output, Self::template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Use it with:");
        println!(
            "   segrules tokenize -r RULES -i input.txt -c {}",
            self.output.display()
        );

        Ok(())
    }

    /// Template configuration content
    pub fn template() -> &'static str {
        r#"# segrules configuration

[tokenize]
# Tokens requested from the engine per call
batch_size = 256

# Stop each input after this many tokens (unlimited when unset)
# max_tokens = 1000

# Copy token text into the output; offsets only when false
include_text = true

[output]
# text, json or markdown
default_format = "text"

# Indent JSON output
pretty_json = true

# Show offsets and flags next to each token
show_flags = false

[performance]
# Tokenize input files in parallel
parallel_files = false

# Number of worker threads (0 = one per core)
worker_threads = 0
"#
    }
}
