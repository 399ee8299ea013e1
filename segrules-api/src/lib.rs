//! Public API for compiled-rule text tokenization
//!
//! This crate wraps the engine in `segrules-core` behind a small, stable
//! surface: load a rule table once, then turn whole inputs into token lists.

#![warn(missing_docs)]

pub mod config;
pub mod dto;
pub mod error;

use error::Result;
use segrules_core::{
    is_terminal, DictionarySegmenter, RuleSet, StrCursor, Token, TokenRange, TokenizerEngine,
};
use std::path::Path;
use std::sync::Arc;

// Re-export key types
pub use config::{Config, ConfigBuilder};
pub use dto::{Input, Metadata, Output, TokenDTO};
pub use error::ApiError;
pub use segrules_core::{FixedWidthSegmenter, LoadError};

/// Main entry point for tokenizing text with a compiled rule table
///
/// The loaded rule set is shared, so cloning a `Segmenter` or handing it to
/// other threads does not copy the table.
#[derive(Clone)]
pub struct Segmenter {
    rules: Arc<RuleSet>,
    config: Config,
    dictionary: Option<Arc<dyn DictionarySegmenter>>,
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter")
            .field("num_states", &self.rules.num_states())
            .field("cat_count", &self.rules.cat_count())
            .field("config", &self.config)
            .field("has_dictionary", &self.dictionary.is_some())
            .finish()
    }
}

impl Segmenter {
    /// Create a segmenter from an already loaded rule set
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self {
            rules,
            config: Config::default(),
            dictionary: None,
        }
    }

    /// Load a rule table from bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::new(RuleSet::load_shared(data)?))
    }

    /// Load a rule table from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Arc::new(RuleSet::from_file(path)?)))
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: Config) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Refine scans over dictionary code points with `dictionary`
    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionarySegmenter>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the shared rule set
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// Process input and return its tokens
    pub fn process(&self, input: Input) -> Result<Output> {
        let start = std::time::Instant::now();

        let text = input.read_text()?;
        let (tokens, consumed, truncated) = self.collect_tokens(&text);

        let source = self.config.include_text.then_some(text.as_str());
        let tokens: Vec<TokenDTO> = tokens
            .iter()
            .map(|t| TokenDTO::from_token(t, source))
            .collect();

        let elapsed = start.elapsed();
        let secs = elapsed.as_secs_f64();
        let metadata = Metadata {
            total_bytes: text.len(),
            consumed_bytes: consumed,
            token_count: tokens.len(),
            terminal_count: tokens.iter().filter(|t| t.terminal).count(),
            truncated,
            processing_time_ms: elapsed.as_millis() as u64,
            throughput_mbps: if secs > 0.0 {
                (text.len() as f64 / 1_048_576.0) / secs
            } else {
                0.0
            },
        };

        Ok(Output { tokens, metadata })
    }

    /// Process text directly (convenience method)
    pub fn process_text(&self, text: &str) -> Result<Output> {
        self.process(Input::from_text(text))
    }

    /// Tokenize `text` without building DTOs
    ///
    /// Terminal tokens end one engine call, not the input; the engine is
    /// called again until it reports nothing or `max_tokens` is reached.
    pub fn tokens(&self, text: &str) -> Vec<Token> {
        self.collect_tokens(text).0
    }

    fn collect_tokens(&self, text: &str) -> (Vec<Token>, usize, bool) {
        let mut engine = TokenizerEngine::new(Arc::clone(&self.rules), StrCursor::new(text));
        engine.set_dictionary(self.dictionary.clone());

        let batch = self.config.batch_size.max(1);
        let mut ranges = vec![TokenRange::default(); batch];
        let mut flags = vec![0i32; batch];
        let mut tokens = Vec::new();

        loop {
            let wanted = match self.config.max_tokens {
                Some(max) => batch.min(max.saturating_sub(tokens.len())),
                None => batch,
            };
            if wanted == 0 {
                break;
            }
            let n = engine.tokenize(wanted, &mut ranges, Some(&mut flags));
            if n == 0 {
                break;
            }
            tokens.extend(
                ranges[..n]
                    .iter()
                    .zip(&flags[..n])
                    .map(|(&range, &flags)| Token { range, flags }),
            );
            if n < wanted && !is_terminal(flags[n - 1]) {
                break;
            }
        }

        let consumed = engine.position();
        let truncated = consumed < text.len()
            && self
                .config
                .max_tokens
                .is_some_and(|max| tokens.len() >= max);
        (tokens, consumed, truncated)
    }
}

// Convenience functions

/// Tokenize text with the rule table stored at `rules_path`
pub fn tokenize_text<P: AsRef<Path>>(rules_path: P, text: &str) -> Result<Output> {
    Segmenter::from_file(rules_path)?.process_text(text)
}

/// Tokenize a file with the rule table stored at `rules_path`
pub fn tokenize_file<P: AsRef<Path>, Q: AsRef<Path>>(rules_path: P, path: Q) -> Result<Output> {
    Segmenter::from_file(rules_path)?.process(Input::from_file(path.as_ref().to_path_buf()))
}
