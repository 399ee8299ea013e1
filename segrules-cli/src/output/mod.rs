//! Output formatting module

use anyhow::Result;
use segrules_api::TokenDTO;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Start the tokens of one input
    fn begin_input(&mut self, name: &str) -> Result<()>;

    /// Format and output a single token
    fn format_token(&mut self, token: &TokenDTO) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// Printable form of a token's text, or its byte range when text was not kept
pub(crate) fn display_text(token: &TokenDTO) -> String {
    match &token.text {
        Some(text) => text.escape_debug().to_string(),
        None => format!("{}..{}", token.start, token.end()),
    }
}
