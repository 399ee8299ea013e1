//! Two-stage code point trie mapping code points to raw category values
//!
//! Code points below `high_start` are looked up through an index of 32-entry
//! data blocks; identical blocks are shared. Everything at or above
//! `high_start` folds to `high_value`, which doubles as the default category
//! for unmapped code points.

use crate::error::{BuildError, LoadError, Result};
use crate::header::{ensure_len, read_u16, read_u32};
use std::collections::HashMap;

/// log2 of the data block length
pub const SHIFT: u32 = 5;

/// Entries per data block
pub const BLOCK_LEN: usize = 1 << SHIFT;

const BLOCK_MASK: u32 = (BLOCK_LEN as u32) - 1;

/// Size of the trie preamble in bytes
pub const TRIE_HEADER_SIZE: usize = 16;

/// One past the largest Unicode scalar value
pub const CODE_POINT_LIMIT: u32 = 0x11_0000;

/// Immutable category trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTrie {
    high_start: u32,
    high_value: u16,
    index: Vec<u16>,
    data: Vec<u16>,
}

impl CategoryTrie {
    /// Decode and validate a serialized trie
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        ensure_len(bytes, TRIE_HEADER_SIZE, "trie header")?;

        let high_start = read_u32(bytes, 0);
        let high_value = read_u16(bytes, 4);
        let index_len = read_u32(bytes, 8) as usize;
        let data_len = read_u32(bytes, 12) as usize;

        if high_start > CODE_POINT_LIMIT || high_start & BLOCK_MASK != 0 {
            return Err(LoadError::InvalidTrie(format!(
                "high start {high_start:#x} is not a block-aligned code point bound"
            )));
        }
        if index_len != (high_start >> SHIFT) as usize {
            return Err(LoadError::InvalidTrie(format!(
                "index length {index_len} does not cover high start {high_start:#x}"
            )));
        }

        let needed = TRIE_HEADER_SIZE + 2 * (index_len + data_len);
        ensure_len(bytes, needed, "trie arrays")?;

        let index: Vec<u16> = (0..index_len)
            .map(|i| read_u16(bytes, TRIE_HEADER_SIZE + 2 * i))
            .collect();
        let data_start = TRIE_HEADER_SIZE + 2 * index_len;
        let data: Vec<u16> = (0..data_len)
            .map(|i| read_u16(bytes, data_start + 2 * i))
            .collect();

        if let Some(bad) = index
            .iter()
            .find(|&&block| usize::from(block) + BLOCK_LEN > data_len)
        {
            return Err(LoadError::InvalidTrie(format!(
                "block offset {bad} overruns {data_len} data entries"
            )));
        }

        Ok(Self {
            high_start,
            high_value,
            index,
            data,
        })
    }

    /// Raw category value of a code point, dictionary bit included
    #[inline]
    pub fn get(&self, code_point: u32) -> u16 {
        if code_point >= self.high_start {
            return self.high_value;
        }
        let block = usize::from(self.index[(code_point >> SHIFT) as usize]);
        self.data[block + (code_point & BLOCK_MASK) as usize]
    }

    /// First code point that folds to the high value
    pub fn high_start(&self) -> u32 {
        self.high_start
    }

    /// Value of every code point at or above `high_start`
    pub fn high_value(&self) -> u16 {
        self.high_value
    }

    /// Every distinct value the trie can return
    pub fn values(&self) -> impl Iterator<Item = u16> + '_ {
        self.data
            .iter()
            .copied()
            .chain(std::iter::once(self.high_value))
    }

    /// Serialized form
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TRIE_HEADER_SIZE + 2 * (self.index.len() + self.data.len()));
        out.extend_from_slice(&self.high_start.to_le_bytes());
        out.extend_from_slice(&self.high_value.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&(self.index.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        for v in self.index.iter().chain(self.data.iter()) {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }
}

/// Builder assigning raw category values to code point ranges
#[derive(Debug, Clone)]
pub struct CategoryTrieBuilder {
    default_value: u16,
    ranges: Vec<(u32, u32, u16)>,
}

impl CategoryTrieBuilder {
    /// Start a trie where every code point maps to `default_value`
    pub fn new(default_value: u16) -> Self {
        Self {
            default_value,
            ranges: Vec::new(),
        }
    }

    /// Map one code point; later assignments win
    pub fn set(&mut self, code_point: char, value: u16) -> &mut Self {
        let cp = u32::from(code_point);
        self.ranges.push((cp, cp, value));
        self
    }

    /// Map the inclusive range `start..=end`; later assignments win
    pub fn set_range(&mut self, start: u32, end: u32, value: u16) -> std::result::Result<&mut Self, BuildError> {
        if start > end || end >= CODE_POINT_LIMIT {
            return Err(BuildError::InvalidRange { start, end });
        }
        self.ranges.push((start, end, value));
        Ok(self)
    }

    /// Every value assigned so far, the default included
    pub fn values(&self) -> impl Iterator<Item = u16> + '_ {
        self.ranges
            .iter()
            .map(|&(_, _, v)| v)
            .chain(std::iter::once(self.default_value))
    }

    /// Compact the assignments into a [`CategoryTrie`]
    pub fn build(&self) -> std::result::Result<CategoryTrie, BuildError> {
        let last_mapped = self
            .ranges
            .iter()
            .filter(|&&(_, _, v)| v != self.default_value)
            .map(|&(_, end, _)| end + 1)
            .max()
            .unwrap_or(0);
        let high_start = last_mapped.div_ceil(BLOCK_LEN as u32) * BLOCK_LEN as u32;

        let mut flat = vec![self.default_value; high_start as usize];
        for &(start, end, value) in &self.ranges {
            if start >= high_start {
                continue;
            }
            let end = end.min(high_start - 1);
            flat[start as usize..=end as usize].fill(value);
        }

        let mut data: Vec<u16> = Vec::new();
        let mut seen: HashMap<&[u16], u16> = HashMap::new();
        let mut index = Vec::with_capacity(flat.len() / BLOCK_LEN);
        for block in flat.chunks(BLOCK_LEN) {
            let offset = match seen.get(block) {
                Some(&offset) => offset,
                None => {
                    let offset = data.len();
                    if offset + BLOCK_LEN > usize::from(u16::MAX) + 1 {
                        return Err(BuildError::TrieTooLarge(offset + BLOCK_LEN));
                    }
                    data.extend_from_slice(block);
                    seen.insert(block, offset as u16);
                    offset as u16
                }
            };
            index.push(offset);
        }

        Ok(CategoryTrie {
            high_start,
            high_value: self.default_value,
            index,
            data,
        })
    }
}
