//! Markdown output formatter

use super::{display_text, OutputFormatter};
use anyhow::Result;
use segrules_api::TokenDTO;
use std::io::Write;

/// Markdown formatter - outputs tokens as a numbered list per input
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    show_flags: bool,
    token_count: usize,
    total_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W, show_flags: bool) -> Self {
        Self {
            writer,
            show_flags,
            token_count: 0,
            total_count: 0,
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn begin_input(&mut self, name: &str) -> Result<()> {
        if self.total_count > 0 || self.token_count > 0 {
            writeln!(self.writer)?;
        }
        self.token_count = 0;
        writeln!(self.writer, "## {name}")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn format_token(&mut self, token: &TokenDTO) -> Result<()> {
        self.token_count += 1;
        self.total_count += 1;
        write!(self.writer, "{}. `{}`", self.token_count, display_text(token))?;
        if self.show_flags {
            write!(self.writer, " ({:#x})", token.flags)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total tokens: {}*", self.total_count)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_list_with_total() {
        let mut f = MarkdownFormatter::new(Vec::new(), true);
        f.begin_input("a.txt").unwrap();
        f.format_token(&TokenDTO {
            start: 0,
            length: 1,
            flags: 0x40000002,
            terminal: true,
            text: Some(".".to_string()),
        })
        .unwrap();
        f.finish().unwrap();

        let out = String::from_utf8(f.into_inner()).unwrap();
        assert_eq!(
            out,
            "## a.txt\n\n1. `.` (0x40000002)\n\n---\n*Total tokens: 1*\n"
        );
    }
}
