//! Data Transfer Objects for API

use crate::error::{ApiError, Result};
use segrules_core::{is_terminal, Token};
use std::fs;
use std::io::Read;
use std::path::PathBuf;

/// Input source for processing
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Input {
    /// Raw text string
    Text(String),
    /// File path
    File(PathBuf),
    /// Raw bytes (UTF-8)
    Bytes(Vec<u8>),
    /// Reader (not serializable)
    #[cfg_attr(feature = "serde", serde(skip))]
    Reader(Box<dyn Read>),
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Input::File(path) => f.debug_tuple("File").field(path).finish(),
            Input::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Input::Reader(_) => f.debug_tuple("Reader").field(&"<dyn Read>").finish(),
        }
    }
}

impl Input {
    /// Create input from text
    pub fn from_text(text: impl Into<String>) -> Self {
        Input::Text(text.into())
    }

    /// Create input from file path
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Input::File(path.into())
    }

    /// Create input from bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }

    /// Create input from a reader
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Input::Reader(Box::new(reader))
    }

    /// Read the text content from the input
    pub fn read_text(self) -> Result<String> {
        match self {
            Input::Text(text) => Ok(text),
            Input::File(path) => fs::read_to_string(&path).map_err(ApiError::Io),
            Input::Bytes(bytes) => String::from_utf8(bytes).map_err(ApiError::Utf8),
            Input::Reader(mut reader) => {
                let mut buffer = String::new();
                reader.read_to_string(&mut buffer).map_err(ApiError::Io)?;
                Ok(buffer)
            }
        }
    }
}

/// One token, detached from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenDTO {
    /// Byte offset of the first byte
    pub start: usize,
    /// Length in bytes
    pub length: usize,
    /// Resolved status flags
    pub flags: i32,
    /// Whether the terminal bit is set in `flags`
    pub terminal: bool,
    /// Token text, when requested
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub text: Option<String>,
}

impl TokenDTO {
    /// Convert an engine token, optionally slicing its text out of `source`
    pub fn from_token(token: &Token, source: Option<&str>) -> Self {
        Self {
            start: token.range.start,
            length: token.range.length,
            flags: token.flags,
            terminal: is_terminal(token.flags),
            text: source
                .and_then(|s| s.get(token.range.as_range()))
                .map(str::to_string),
        }
    }

    /// Byte offset one past the last byte
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Processing metadata with runtime statistics
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Total bytes of input
    pub total_bytes: usize,
    /// Bytes consumed by the engine (suppressed tokens included)
    pub consumed_bytes: usize,
    /// Number of tokens reported
    pub token_count: usize,
    /// Number of reported tokens carrying the terminal bit
    pub terminal_count: usize,
    /// Output stopped at `max_tokens` before the input ran out
    pub truncated: bool,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
    /// Throughput in MB/s
    pub throughput_mbps: f64,
}

/// Complete output with tokens and metadata
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Output {
    /// Reported tokens in input order
    pub tokens: Vec<TokenDTO>,
    /// Processing metadata
    pub metadata: Metadata,
}
