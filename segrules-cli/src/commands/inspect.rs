//! Inspect command implementation

use crate::commands::load_rules;
use anyhow::Result;
use clap::Args;
use segrules_core::RuleSet;
use std::fmt;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Compiled rule table
    #[arg(short, long, value_name = "FILE")]
    pub rules: PathBuf,

    /// Also print the embedded rule source text
    #[arg(long)]
    pub source: bool,
}

impl InspectArgs {
    /// Execute the inspect command
    pub fn execute(&self) -> Result<()> {
        let rules = load_rules(&self.rules)?;

        println!("Rule table: {}", self.rules.display());
        print!("{}", TableSummary::from_rules(&rules));

        if self.source {
            println!();
            println!("{}", rules.rule_source());
        }
        Ok(())
    }
}

/// What a loaded rule table contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    /// Format version bytes
    pub format_version: [u8; 4],
    /// Total blob length in bytes
    pub length: usize,
    /// Number of character categories
    pub categories: usize,
    /// Number of forward states
    pub states: usize,
    /// Number of status table entries
    pub status_entries: usize,
    /// Reverse table present
    pub has_reverse: bool,
    /// Safe-reverse table present
    pub has_safe_reverse: bool,
    /// States with an unconditional accept
    pub accepting_states: usize,
    /// States with a status tag
    pub tagged_states: usize,
    /// States whose tokens end a call
    pub terminal_states: Vec<u16>,
    /// States whose tokens are never reported
    pub suppressed_states: Vec<u16>,
    /// Rule source length in bytes
    pub source_bytes: usize,
}

impl TableSummary {
    /// Summarize a loaded rule set
    pub fn from_rules(rules: &RuleSet) -> Self {
        let header = rules.header();
        let table = rules.forward_table();
        let resolved = rules.resolved_flags();

        Self {
            format_version: header.format_version,
            length: header.length,
            categories: rules.cat_count(),
            states: rules.num_states(),
            status_entries: rules.status_table().len(),
            has_reverse: header.reverse.is_present(),
            has_safe_reverse: header.safe_reverse.is_present(),
            accepting_states: table.rows().filter(|(_, row)| row.is_accepting()).count(),
            tagged_states: table.rows().filter(|(_, row)| row.tag_index != 0).count(),
            terminal_states: resolved.terminal_states().collect(),
            suppressed_states: resolved.suppressed_states().collect(),
            source_bytes: rules.rule_source().len(),
        }
    }
}

fn presence(present: bool) -> &'static str {
    if present {
        "present"
    } else {
        "absent"
    }
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.format_version;
        writeln!(f, "  Format version: {a}.{b}.{c}.{d}")?;
        writeln!(f, "  Length: {} bytes", self.length)?;
        writeln!(f, "  Categories: {}", self.categories)?;
        writeln!(f, "  States: {}", self.states)?;
        writeln!(f, "  Status entries: {}", self.status_entries)?;
        writeln!(f, "  Reverse table: {}", presence(self.has_reverse))?;
        writeln!(f, "  Safe-reverse table: {}", presence(self.has_safe_reverse))?;
        writeln!(f, "  Accepting states: {}", self.accepting_states)?;
        writeln!(f, "  Tagged states: {}", self.tagged_states)?;
        writeln!(f, "  Terminal states: {:?}", self.terminal_states)?;
        writeln!(f, "  Suppressed states: {:?}", self.suppressed_states)?;
        writeln!(f, "  Rule source: {} bytes", self.source_bytes)
    }
}
