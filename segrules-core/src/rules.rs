//! Loaded, validated rule set
//!
//! A [`RuleSet`] is immutable once loaded. Engines share it through an
//! [`Arc`], so any number of engines on any number of threads can scan with
//! the same tables while each keeps its own cursor and scan state.

use crate::classifier::{CategoryClassifier, DICTIONARY_FLAG};
use crate::error::{LoadError, Result};
use crate::header::RuleTableHeader;
use crate::resolver::ResolvedFlags;
use crate::status::StatusTable;
use crate::table::StateTable;
use crate::trie::{CategoryTrie, CategoryTrieBuilder};
use std::path::Path;
use std::sync::Arc;

/// Compiled rule table plus everything derived from it at load time
#[derive(Debug, Clone)]
pub struct RuleSet {
    header: RuleTableHeader,
    forward: StateTable,
    classifier: CategoryClassifier,
    status: StatusTable,
    resolved: ResolvedFlags,
    rule_source: String,
}

impl RuleSet {
    /// Validate `data` and build a rule set from it
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = RuleTableHeader::parse(data)?;
        let cat_count = header.cat_count;

        let forward = StateTable::parse(&data[header.forward.range()], cat_count)?;

        let trie = if header.trie.is_present() {
            CategoryTrie::parse(&data[header.trie.range()])?
        } else {
            // No trie: every code point lands in category 0
            CategoryTrieBuilder::new(0)
                .build()
                .map_err(|e| LoadError::InvalidTrie(e.to_string()))?
        };
        if let Some(category) = trie
            .values()
            .map(|v| v & !DICTIONARY_FLAG)
            .find(|&c| usize::from(c) >= cat_count)
        {
            return Err(LoadError::CategoryOutOfRange {
                category,
                cat_count,
            });
        }

        let status = StatusTable::parse(&data[header.status.range()])?;
        for (state, row) in forward.rows() {
            let valid = match row.tag_index {
                0 => true,
                t if t < 0 => false,
                t => status.run(t as usize).is_some(),
            };
            if !valid {
                return Err(LoadError::InvalidTagIndex {
                    state: usize::from(state),
                    tag: row.tag_index,
                });
            }
        }

        let rule_source = std::str::from_utf8(&data[header.rule_source.range()])?.to_owned();

        let resolved = ResolvedFlags::resolve(&forward, &status);
        let classifier = CategoryClassifier::new(trie);

        tracing::debug!(
            states = forward.num_states(),
            categories = cat_count,
            status_entries = status.len(),
            "loaded rule set"
        );

        Ok(Self {
            header,
            forward,
            classifier,
            status,
            resolved,
            rule_source,
        })
    }

    /// Read and validate a rule table file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::from_bytes(&data)
    }

    /// Validate `data` and wrap the result for sharing between engines
    pub fn load_shared(data: &[u8]) -> Result<Arc<Self>> {
        Self::from_bytes(data).map(Arc::new)
    }

    /// Decoded header
    pub fn header(&self) -> &RuleTableHeader {
        &self.header
    }

    /// Forward state table
    pub fn forward_table(&self) -> &StateTable {
        &self.forward
    }

    /// Code point classifier
    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Status flag table
    pub fn status_table(&self) -> &StatusTable {
        &self.status
    }

    /// Resolved flags per state
    pub fn resolved_flags(&self) -> &ResolvedFlags {
        &self.resolved
    }

    /// Rule source text the table was compiled from
    pub fn rule_source(&self) -> &str {
        &self.rule_source
    }

    /// Full status run attached to `state`, if it is tagged
    pub fn status_run(&self, state: u16) -> Option<&[i32]> {
        let tag = self.forward.row(state).tag_index;
        if tag <= 0 {
            return None;
        }
        self.status.run(tag as usize)
    }

    /// Number of categories
    pub fn cat_count(&self) -> usize {
        self.header.cat_count
    }

    /// Number of DFA states
    pub fn num_states(&self) -> usize {
        self.forward.num_states()
    }
}
