//! Rule table header
//!
//! Every integer in a rule table blob is little-endian. The header is a fixed
//! 88-byte block: magic, format version, total length, category count, six
//! `(offset, length)` section pairs and six reserved words.

use crate::error::{LoadError, Result};

/// Magic number at the start of every rule table
pub const MAGIC: u32 = 0xB1A0;

/// Format version this crate reads and writes
pub const FORMAT_VERSION: [u8; 4] = [1, 0, 0, 0];

/// Size of the fixed header in bytes
pub const HEADER_SIZE: usize = 88;

/// Location of one section inside the blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Section {
    /// Byte offset from the start of the blob
    pub offset: usize,
    /// Length in bytes (0 means absent)
    pub length: usize,
}

impl Section {
    /// Whether the section is present
    pub fn is_present(&self) -> bool {
        self.length > 0
    }

    /// Byte range of the section
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Decoded rule table header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTableHeader {
    /// Format version bytes
    pub format_version: [u8; 4],
    /// Total blob length
    pub length: usize,
    /// Number of character categories
    pub cat_count: usize,
    /// Forward state table (required)
    pub forward: Section,
    /// Reverse state table (unused by the engine)
    pub reverse: Section,
    /// Safe-reverse state table (unused by the engine)
    pub safe_reverse: Section,
    /// Character category trie
    pub trie: Section,
    /// Original rule source text
    pub rule_source: Section,
    /// Status flag table
    pub status: Section,
}

impl RuleTableHeader {
    /// Parse and validate the header of `data`
    ///
    /// Checks magic, version, declared length and that every section lies
    /// inside the blob. Section contents are validated by their own loaders.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(LoadError::Truncated {
                what: "header",
                needed: HEADER_SIZE,
                available: data.len(),
            });
        }

        let magic = read_u32(data, 0);
        if magic != MAGIC {
            return Err(LoadError::BadMagic {
                found: magic,
                expected: MAGIC,
            });
        }

        let format_version = [data[4], data[5], data[6], data[7]];
        if format_version[0] != FORMAT_VERSION[0] {
            return Err(LoadError::UnsupportedVersion {
                found: format_version,
            });
        }

        let length = read_u32(data, 8) as usize;
        if length != data.len() {
            return Err(LoadError::LengthMismatch {
                declared: length,
                actual: data.len(),
            });
        }

        let cat_count = read_u32(data, 12);
        if cat_count == 0 || cat_count > u32::from(u16::MAX) {
            return Err(LoadError::InvalidCategoryCount(cat_count));
        }

        let section = |name: &'static str, at: usize| -> Result<Section> {
            let offset = read_u32(data, at) as usize;
            let length = read_u32(data, at + 4) as usize;
            match offset.checked_add(length) {
                Some(end) if end <= data.len() => Ok(Section { offset, length }),
                _ => Err(LoadError::SectionOutOfBounds {
                    section: name,
                    offset,
                    length,
                    total: data.len(),
                }),
            }
        };

        let header = Self {
            format_version,
            length,
            cat_count: cat_count as usize,
            forward: section("forward table", 16)?,
            reverse: section("reverse table", 24)?,
            safe_reverse: section("safe-reverse table", 32)?,
            trie: section("trie", 40)?,
            rule_source: section("rule source", 48)?,
            status: section("status table", 56)?,
        };

        if !header.forward.is_present() {
            return Err(LoadError::MissingForwardTable);
        }

        Ok(header)
    }

    /// Serialize the header into its 88-byte on-disk form
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buf[4..8].copy_from_slice(&self.format_version);
        buf[8..12].copy_from_slice(&(self.length as u32).to_le_bytes());
        buf[12..16].copy_from_slice(&(self.cat_count as u32).to_le_bytes());
        let sections = [
            self.forward,
            self.reverse,
            self.safe_reverse,
            self.trie,
            self.rule_source,
            self.status,
        ];
        for (i, s) in sections.iter().enumerate() {
            let at = 16 + i * 8;
            buf[at..at + 4].copy_from_slice(&(s.offset as u32).to_le_bytes());
            buf[at + 4..at + 8].copy_from_slice(&(s.length as u32).to_le_bytes());
        }
        buf
    }
}

#[inline]
pub(crate) fn read_u16(data: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([data[off], data[off + 1]])
}

#[inline]
pub(crate) fn read_i16(data: &[u8], off: usize) -> i16 {
    i16::from_le_bytes([data[off], data[off + 1]])
}

#[inline]
pub(crate) fn read_u32(data: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
}

#[inline]
pub(crate) fn read_i32(data: &[u8], off: usize) -> i32 {
    i32::from_le_bytes([data[off], data[off + 1], data[off + 2], data[off + 3]])
}

/// Fail with [`LoadError::Truncated`] unless `data` holds `needed` bytes
pub(crate) fn ensure_len(data: &[u8], needed: usize, what: &'static str) -> Result<()> {
    if data.len() < needed {
        return Err(LoadError::Truncated {
            what,
            needed,
            available: data.len(),
        });
    }
    Ok(())
}
