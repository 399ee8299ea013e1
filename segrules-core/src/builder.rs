//! Assembly of binary rule tables
//!
//! Turns an already-computed DFA (states, category assignments, status runs)
//! into the on-disk layout read by [`crate::RuleSet`]. Compiling a grammar
//! into that DFA is not this crate's business.

use crate::classifier::DICTIONARY_FLAG;
use crate::error::BuildError;
use crate::header::{RuleTableHeader, Section, FORMAT_VERSION, HEADER_SIZE};
use crate::status::StatusTable;
use crate::table::{row_length, ACCEPTING, MAX_STATES, TABLE_HEADER_SIZE};
use crate::trie::CategoryTrieBuilder;

/// One DFA state as handed to the builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSpec {
    /// 0 = not accepting, -1 = unconditional accept
    pub accepting: i16,
    /// Lookahead marker, stored verbatim
    pub look_ahead: i16,
    /// Index of the status run, 0 for none
    pub tag_index: i16,
    /// Next state per category
    pub next: Vec<u16>,
}

impl StateSpec {
    /// Non-accepting state
    pub fn new(next: Vec<u16>) -> Self {
        Self {
            accepting: 0,
            look_ahead: 0,
            tag_index: 0,
            next,
        }
    }

    /// Unconditionally accepting state
    pub fn accepting(next: Vec<u16>) -> Self {
        Self {
            accepting: ACCEPTING,
            ..Self::new(next)
        }
    }

    /// Attach a status run
    pub fn with_tag(mut self, tag_index: i16) -> Self {
        self.tag_index = tag_index;
        self
    }
}

/// Builder for rule table blobs
#[derive(Debug, Clone)]
pub struct RuleTableBuilder {
    cat_count: usize,
    forward: Vec<StateSpec>,
    reverse: Vec<StateSpec>,
    safe_reverse: Vec<StateSpec>,
    categories: CategoryTrieBuilder,
    status: Vec<i32>,
    tag_overflow: Option<usize>,
    rule_source: String,
}

impl RuleTableBuilder {
    /// Start a table with `cat_count` categories
    ///
    /// The status table is seeded with the run `[1, 0]` at index 0 so that
    /// tag index 0 keeps meaning "no tag".
    pub fn new(cat_count: usize) -> Self {
        Self {
            cat_count,
            forward: Vec::new(),
            reverse: Vec::new(),
            safe_reverse: Vec::new(),
            categories: CategoryTrieBuilder::new(0),
            status: vec![1, 0],
            tag_overflow: None,
            rule_source: String::new(),
        }
    }

    /// Append a forward state, returning its id
    ///
    /// The first state added is STOP, the second START. Past
    /// [`MAX_STATES`] the returned id saturates and [`Self::build`] fails.
    pub fn add_state(&mut self, state: StateSpec) -> u16 {
        self.forward.push(state);
        u16::try_from(self.forward.len() - 1).unwrap_or(u16::MAX)
    }

    /// Mutable access to a forward state
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by [`Self::add_state`].
    pub fn state_mut(&mut self, id: u16) -> &mut StateSpec {
        &mut self.forward[usize::from(id)]
    }

    /// Set the optional reverse table
    pub fn reverse_states(&mut self, states: Vec<StateSpec>) -> &mut Self {
        self.reverse = states;
        self
    }

    /// Set the optional safe-reverse table
    pub fn safe_reverse_states(&mut self, states: Vec<StateSpec>) -> &mut Self {
        self.safe_reverse = states;
        self
    }

    /// Category assignments; unassigned code points get category 0
    pub fn categories_mut(&mut self) -> &mut CategoryTrieBuilder {
        &mut self.categories
    }

    /// Append a status run and return its tag index
    pub fn add_status_run(&mut self, values: &[i32]) -> i16 {
        let index = self.status.len();
        self.status.push(values.len() as i32);
        self.status.extend_from_slice(values);
        match i16::try_from(index) {
            Ok(tag) => tag,
            Err(_) => {
                self.tag_overflow.get_or_insert(index);
                i16::MAX
            }
        }
    }

    /// Set the rule source text embedded in the table
    pub fn rule_source(&mut self, source: &str) -> &mut Self {
        self.rule_source = source.to_owned();
        self
    }

    /// Validate and serialize
    pub fn build(&self) -> Result<Vec<u8>, BuildError> {
        if self.cat_count == 0 || self.cat_count > usize::from(u16::MAX) {
            return Err(BuildError::InvalidCategoryCount(self.cat_count));
        }
        if let Some(index) = self.tag_overflow {
            return Err(BuildError::TagIndexOverflow(index));
        }
        if self.forward.len() < 2 {
            return Err(BuildError::TooFewStates(self.forward.len()));
        }
        for table in [&self.forward, &self.reverse, &self.safe_reverse] {
            if table.len() > MAX_STATES {
                return Err(BuildError::TooManyStates(table.len()));
            }
            self.check_states(table)?;
        }
        if let Some(category) = self
            .categories
            .values()
            .map(|v| v & !DICTIONARY_FLAG)
            .find(|&c| usize::from(c) >= self.cat_count)
        {
            return Err(BuildError::CategoryOutOfRange {
                category,
                cat_count: self.cat_count,
            });
        }
        self.build_unchecked()
    }

    /// Serialize without semantic validation
    ///
    /// Produces tables a loader must reject; meant for exercising load-time
    /// validation.
    pub fn build_unchecked(&self) -> Result<Vec<u8>, BuildError> {
        let trie = self.categories.build()?.to_bytes();
        let status = StatusTable::new(self.status.clone()).to_bytes();

        let mut out = vec![0u8; HEADER_SIZE];
        let forward = append(&mut out, &self.encode_states(&self.forward));
        let reverse = self.append_optional(&mut out, &self.reverse);
        let safe_reverse = self.append_optional(&mut out, &self.safe_reverse);
        let trie = append(&mut out, &trie);
        let rule_source = append(&mut out, self.rule_source.as_bytes());
        let status = append(&mut out, &status);

        let header = RuleTableHeader {
            format_version: FORMAT_VERSION,
            length: out.len(),
            cat_count: self.cat_count,
            forward,
            reverse,
            safe_reverse,
            trie,
            rule_source,
            status,
        };
        out[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        Ok(out)
    }

    fn check_states(&self, states: &[StateSpec]) -> Result<(), BuildError> {
        for (id, state) in states.iter().enumerate() {
            if state.next.len() != self.cat_count {
                return Err(BuildError::TransitionWidth {
                    state: id,
                    found: state.next.len(),
                    expected: self.cat_count,
                });
            }
            if let Some(&target) = state.next.iter().find(|&&n| usize::from(n) >= states.len()) {
                return Err(BuildError::UnknownState { state: id, target });
            }
        }
        Ok(())
    }

    fn append_optional(&self, out: &mut Vec<u8>, states: &[StateSpec]) -> Section {
        if states.is_empty() {
            return Section::default();
        }
        append(out, &self.encode_states(states))
    }

    fn encode_states(&self, states: &[StateSpec]) -> Vec<u8> {
        let row_len = row_length(self.cat_count);
        let mut out = Vec::with_capacity(TABLE_HEADER_SIZE + states.len() * row_len);
        out.extend_from_slice(&(states.len() as u32).to_le_bytes());
        out.extend_from_slice(&(row_len as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for state in states {
            out.extend_from_slice(&state.accepting.to_le_bytes());
            out.extend_from_slice(&state.look_ahead.to_le_bytes());
            out.extend_from_slice(&state.tag_index.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            // Pad or cut to the declared width so unchecked output keeps its row stride
            for category in 0..self.cat_count {
                let next = state.next.get(category).copied().unwrap_or(0);
                out.extend_from_slice(&next.to_le_bytes());
            }
        }
        out
    }
}

/// Append `bytes` 4-byte aligned and return where they landed
fn append(out: &mut Vec<u8>, bytes: &[u8]) -> Section {
    while out.len() % 4 != 0 {
        out.push(0);
    }
    let offset = out.len();
    out.extend_from_slice(bytes);
    Section {
        offset,
        length: bytes.len(),
    }
}
