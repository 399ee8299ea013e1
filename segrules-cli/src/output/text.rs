//! Plain text output formatter

use super::{display_text, OutputFormatter};
use anyhow::Result;
use segrules_api::TokenDTO;
use std::io::{self, Write};

/// Plain text formatter - outputs one token per line
pub struct TextFormatter<W: Write> {
    writer: W,
    show_flags: bool,
    headers: bool,
    inputs: usize,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W, show_flags: bool) -> Self {
        Self {
            writer,
            show_flags,
            headers: false,
            inputs: 0,
        }
    }

    /// Print a `==> name <==` header before each input
    pub fn with_headers(mut self, headers: bool) -> Self {
        self.headers = headers;
        self
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout(show_flags: bool) -> Self {
        Self::new(io::stdout(), show_flags)
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn begin_input(&mut self, name: &str) -> Result<()> {
        if !self.headers {
            return Ok(());
        }
        if self.inputs > 0 {
            writeln!(self.writer)?;
        }
        self.inputs += 1;
        writeln!(self.writer, "==> {name} <==")?;
        Ok(())
    }

    fn format_token(&mut self, token: &TokenDTO) -> Result<()> {
        if self.show_flags {
            writeln!(
                self.writer,
                "{}\t{}\t{:#x}\t{}",
                token.start,
                token.end(),
                token.flags,
                display_text(token)
            )?;
        } else {
            writeln!(self.writer, "{}", display_text(token))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(start: usize, text: &str, flags: i32) -> TokenDTO {
        TokenDTO {
            start,
            length: text.len(),
            flags,
            terminal: false,
            text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_one_token_per_line() {
        let mut f = TextFormatter::new(Vec::new(), false);
        f.begin_input("a.txt").unwrap();
        f.format_token(&token(0, "hi", 1)).unwrap();
        f.format_token(&token(3, "there", 1)).unwrap();
        f.finish().unwrap();
        let out = String::from_utf8(f.into_inner()).unwrap();
        assert_eq!(out, "hi\nthere\n");
    }

    #[test]
    fn test_show_flags_columns() {
        let mut f = TextFormatter::new(Vec::new(), true);
        f.format_token(&token(3, "there", 0x40000002)).unwrap();
        let out = String::from_utf8(f.into_inner()).unwrap();
        assert_eq!(out, "3\t8\t0x40000002\tthere\n");
    }

    #[test]
    fn test_inputs_are_separated() {
        let mut f = TextFormatter::new(Vec::new(), false).with_headers(true);
        f.begin_input("a").unwrap();
        f.begin_input("b").unwrap();
        let out = String::from_utf8(f.into_inner()).unwrap();
        assert_eq!(out, "==> a <==\n\n==> b <==\n");
    }
}
