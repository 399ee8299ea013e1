//! Compiled-rule tokenizer
//!
//! This crate runs text segmentation rules that were compiled offline into a
//! deterministic finite automaton. A rule table blob carries the DFA, a trie
//! assigning every code point a category, and a status table from which each
//! accepting state's reported flags are derived.
//!
//! # Architecture
//!
//! - **Format layer**: [`header`], [`table`], [`trie`], [`status`] decode and
//!   validate the binary sections; [`builder`] writes them.
//! - **Load layer**: [`RuleSet`] validates a blob once, samples the
//!   classifier fast path and resolves per-state flags. It is immutable and
//!   shared between engines through an `Arc`.
//! - **Scan layer**: [`TokenizerEngine`] drives the DFA over a
//!   [`TextCursor`], with optional break-cache replay and dictionary
//!   hand-off.
//!
//! # Example
//!
//! ```rust
//! use segrules_core::{RuleSet, RuleTableBuilder, StateSpec, StrCursor, TokenizerEngine};
//!
//! // Category 1 = letters; letter runs become tokens, anything else is a
//! // single-code-point token.
//! let mut builder = RuleTableBuilder::new(2);
//! builder.categories_mut().set_range('a' as u32, 'z' as u32, 1).unwrap();
//! builder.add_state(StateSpec::new(vec![0, 0]));
//! builder.add_state(StateSpec::new(vec![3, 2]));
//! builder.add_state(StateSpec::accepting(vec![0, 2]));
//! builder.add_state(StateSpec::accepting(vec![0, 0]));
//!
//! let rules = RuleSet::load_shared(&builder.build().unwrap()).unwrap();
//! let mut engine = TokenizerEngine::new(rules, StrCursor::new("hi there"));
//! let tokens: Vec<_> = engine.tokens().map(|t| t.range.as_range()).collect();
//! assert_eq!(tokens, vec![0..2, 2..3, 3..8]);
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod cache;
pub mod classifier;
pub mod cursor;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod header;
pub mod resolver;
pub mod rules;
pub mod status;
pub mod table;
pub mod trie;

pub use builder::{RuleTableBuilder, StateSpec};
pub use cache::BreakCache;
pub use classifier::{CategoryClassifier, DICTIONARY_FLAG};
pub use cursor::{StrCursor, TextCursor, Utf16Cursor};
pub use dictionary::{DictionarySegmenter, FixedWidthSegmenter};
pub use engine::{Token, TokenRange, TokenizerEngine, Tokens};
pub use error::{BuildError, LoadError, Result};
pub use header::RuleTableHeader;
pub use resolver::{is_terminal, ResolvedFlags};
pub use rules::RuleSet;
pub use status::{StatusTable, SUPPRESSED, TERMINAL_FLAG};
pub use table::{StateRow, StateTable, MAX_STATES, START_STATE, STOP_STATE};
pub use trie::{CategoryTrie, CategoryTrieBuilder};
