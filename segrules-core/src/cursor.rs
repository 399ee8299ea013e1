//! Text cursors
//!
//! A cursor walks code points forward from a native offset. Native offsets
//! are whatever unit the underlying text uses: bytes for UTF-8, code units
//! for UTF-16. Restarting is done by positioning, never by rewinding.

/// Forward code point cursor over some text
pub trait TextCursor {
    /// Current native offset
    fn offset(&self) -> usize;

    /// Position the cursor
    ///
    /// Offsets inside a code point snap back to its start; offsets past the
    /// end clamp to the end.
    fn set_offset(&mut self, offset: usize);

    /// Read the code point at the cursor and advance past it
    ///
    /// Returns `None` at the end of the text.
    fn next_code_point(&mut self) -> Option<char>;

    /// Length of the text in native units
    fn len(&self) -> usize;

    /// Whether the text is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cursor over UTF-8 text with byte offsets
#[derive(Debug, Clone)]
pub struct StrCursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> StrCursor<'a> {
    /// Cursor at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    /// The underlying text
    pub fn text(&self) -> &'a str {
        self.text
    }
}

impl TextCursor for StrCursor<'_> {
    fn offset(&self) -> usize {
        self.pos
    }

    fn set_offset(&mut self, offset: usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        self.pos = offset;
    }

    #[inline]
    fn next_code_point(&mut self) -> Option<char> {
        let c = self.text[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn len(&self) -> usize {
        self.text.len()
    }
}

/// Cursor over UTF-16 code units with code unit offsets
///
/// Unpaired surrogates read as U+FFFD.
#[derive(Debug, Clone)]
pub struct Utf16Cursor<'a> {
    units: &'a [u16],
    pos: usize,
}

impl<'a> Utf16Cursor<'a> {
    /// Cursor at the start of `units`
    pub fn new(units: &'a [u16]) -> Self {
        Self { units, pos: 0 }
    }
}

fn is_lead_surrogate(unit: u16) -> bool {
    (0xD800..0xDC00).contains(&unit)
}

fn is_trail_surrogate(unit: u16) -> bool {
    (0xDC00..0xE000).contains(&unit)
}

impl TextCursor for Utf16Cursor<'_> {
    fn offset(&self) -> usize {
        self.pos
    }

    fn set_offset(&mut self, offset: usize) {
        let mut offset = offset.min(self.units.len());
        if offset > 0
            && offset < self.units.len()
            && is_trail_surrogate(self.units[offset])
            && is_lead_surrogate(self.units[offset - 1])
        {
            offset -= 1;
        }
        self.pos = offset;
    }

    fn next_code_point(&mut self) -> Option<char> {
        let decoded = char::decode_utf16(self.units[self.pos..].iter().copied()).next()?;
        let c = match decoded {
            Ok(c) => {
                self.pos += c.len_utf16();
                c
            }
            Err(_) => {
                self.pos += 1;
                char::REPLACEMENT_CHARACTER
            }
        };
        Some(c)
    }

    fn len(&self) -> usize {
        self.units.len()
    }
}
