//! High-level configuration API

use crate::error::{ApiError, Result};

/// Default number of tokens requested per engine call
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Configuration for a [`Segmenter`](crate::Segmenter)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Tokens requested from the engine per call
    pub batch_size: usize,
    /// Stop after this many tokens
    pub max_tokens: Option<usize>,
    /// Copy each token's text into the output
    pub include_text: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_tokens: None,
            include_text: true,
        }
    }
}

impl Config {
    /// Create a builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Offsets and flags only, no token text
    pub fn ranges_only() -> Self {
        Self {
            include_text: false,
            ..Self::default()
        }
    }

    /// Check the configuration for values the engine cannot use
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ApiError::Config(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration builder
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of tokens requested per engine call
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Limit the total number of tokens produced
    pub fn max_tokens(mut self, max: Option<usize>) -> Self {
        self.config.max_tokens = max;
        self
    }

    /// Include token text in the output
    pub fn include_text(mut self, include: bool) -> Self {
        self.config.include_text = include;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.max_tokens, None);
        assert!(config.include_text);
        assert!(!Config::ranges_only().include_text);
    }

    #[test]
    fn test_builder_rejects_zero_batch() {
        let err = Config::builder().batch_size(0).build().unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = Config::builder()
            .batch_size(8)
            .max_tokens(Some(3))
            .include_text(false)
            .build()
            .unwrap();
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.max_tokens, Some(3));
        assert!(!config.include_text);
    }
}
