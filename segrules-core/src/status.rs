//! Packed rule status table
//!
//! A flat run of i32 values. The run addressed by a tag index starts with a
//! count followed by that many status values.

use crate::error::{LoadError, Result};
use crate::header::read_i32;

/// Status value marking a state whose tokens are not reported
pub const SUPPRESSED: i32 = -1;

/// Status bit that ends a `tokenize` call right after the token is written
pub const TERMINAL_FLAG: i32 = 0x4000_0000;

/// Immutable status flag table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    values: Vec<i32>,
}

impl StatusTable {
    /// Wrap already-decoded values
    pub fn new(values: Vec<i32>) -> Self {
        Self { values }
    }

    /// Decode a serialized status section
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() % 4 != 0 {
            return Err(LoadError::MisalignedStatusTable(bytes.len()));
        }
        let values = (0..bytes.len() / 4)
            .map(|i| read_i32(bytes, i * 4))
            .collect();
        Ok(Self { values })
    }

    /// Status values of the run at `tag`, without the leading count
    ///
    /// Returns `None` when the run does not fit the table. A negative count
    /// reads as an empty run.
    pub fn run(&self, tag: usize) -> Option<&[i32]> {
        let count = usize::try_from(*self.values.get(tag)?).unwrap_or(0);
        let start = tag + 1;
        self.values.get(start..start.checked_add(count)?)
    }

    /// Number of i32 entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values
    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }

    /// Serialized form
    pub fn to_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}
