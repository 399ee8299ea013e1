//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use segrules_api::TokenDTO;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// JSON formatter - outputs one object per input, tokens included
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
    inputs: Vec<InputData>,
}

/// Data structure for JSON output
#[derive(Debug, Serialize, Deserialize)]
pub struct InputData {
    /// Input name (file path)
    pub input: String,
    /// Tokens in input order
    pub tokens: Vec<TokenDTO>,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            pretty,
            inputs: Vec::new(),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn begin_input(&mut self, name: &str) -> Result<()> {
        self.inputs.push(InputData {
            input: name.to_string(),
            tokens: Vec::new(),
        });
        Ok(())
    }

    fn format_token(&mut self, token: &TokenDTO) -> Result<()> {
        if self.inputs.is_empty() {
            self.begin_input("")?;
        }
        if let Some(current) = self.inputs.last_mut() {
            current.tokens.push(token.clone());
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.inputs)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.inputs)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
