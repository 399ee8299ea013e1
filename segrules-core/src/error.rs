//! Load-time and build-time error types
//!
//! Loading is the only hard failure point of the crate: a [`crate::RuleSet`]
//! is never constructed against a table that fails validation, and nothing
//! can fail once scanning has started.

use thiserror::Error;

/// Errors raised while validating a binary rule table
#[derive(Error, Debug)]
pub enum LoadError {
    /// The blob is too short to hold the structure being read
    #[error("rule table truncated: {what} needs {needed} bytes, {available} available")]
    Truncated {
        /// The structure that could not be read
        what: &'static str,
        /// Bytes required
        needed: usize,
        /// Bytes available
        available: usize,
    },

    /// The header magic does not match
    #[error("bad magic number {found:#06x}, expected {expected:#06x}")]
    BadMagic {
        /// Magic value read from the blob
        found: u32,
        /// Magic value this loader understands
        expected: u32,
    },

    /// The format version is not supported
    #[error("unsupported format version {found:?}")]
    UnsupportedVersion {
        /// Version bytes read from the blob
        found: [u8; 4],
    },

    /// The header's declared length disagrees with the blob
    #[error("declared length {declared} does not match blob length {actual}")]
    LengthMismatch {
        /// Length stored in the header
        declared: usize,
        /// Length of the supplied bytes
        actual: usize,
    },

    /// A section's offset/length pair points outside the blob
    #[error("{section} section [{offset}, +{length}) lies outside the {total}-byte blob")]
    SectionOutOfBounds {
        /// Section name
        section: &'static str,
        /// Section offset
        offset: usize,
        /// Section length
        length: usize,
        /// Blob length
        total: usize,
    },

    /// The forward state table is absent
    #[error("forward state table is missing")]
    MissingForwardTable,

    /// The category count is unusable
    #[error("invalid category count {0}")]
    InvalidCategoryCount(u32),

    /// A state table's row length disagrees with the category count
    #[error("row length {found} does not match expected {expected} for {cat_count} categories")]
    RowLengthMismatch {
        /// Row length stored in the table header
        found: usize,
        /// Row length implied by the category count
        expected: usize,
        /// Category count from the blob header
        cat_count: usize,
    },

    /// The state table has fewer than the two fixed states
    #[error("state table has {0} states, at least 2 (STOP and START) are required")]
    TooFewStates(usize),

    /// The state table has more states than a u16 transition can address
    #[error("state table has {0} states, at most 65536 are addressable")]
    TooManyStates(usize),

    /// A transition targets a state that does not exist
    #[error("state {state} category {category} transitions to {target}, table has {num_states} states")]
    InvalidNextState {
        /// Source state
        state: usize,
        /// Category column
        category: usize,
        /// Transition target
        target: u16,
        /// Number of states in the table
        num_states: usize,
    },

    /// A row's tag index does not address a complete status run
    #[error("state {state} has tag index {tag} outside the status table")]
    InvalidTagIndex {
        /// Offending state
        state: usize,
        /// Tag index stored in the row
        tag: i16,
    },

    /// The category trie is malformed
    #[error("malformed category trie: {0}")]
    InvalidTrie(String),

    /// A trie value names a category the state table does not have
    #[error("trie maps to category {category}, table only has {cat_count} categories")]
    CategoryOutOfRange {
        /// Category after stripping the dictionary bit
        category: u16,
        /// Category count from the blob header
        cat_count: usize,
    },

    /// The status section length is not a whole number of i32 values
    #[error("status table length {0} is not a multiple of 4")]
    MisalignedStatusTable(usize),

    /// The embedded rule source is not valid UTF-8
    #[error("rule source is not valid UTF-8: {0}")]
    InvalidRuleSource(#[from] std::str::Utf8Error),

    /// Reading the blob from disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while assembling a binary rule table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// At least STOP and START must be present
    #[error("a rule table needs at least 2 states, got {0}")]
    TooFewStates(usize),

    /// State ids must fit the on-disk u16 transitions
    #[error("a rule table holds at most 65536 states, got {0}")]
    TooManyStates(usize),

    /// The category count must fit the on-disk u16 columns
    #[error("invalid category count {0}")]
    InvalidCategoryCount(usize),

    /// A state's transition vector has the wrong width
    #[error("state {state} has {found} transitions, expected {expected}")]
    TransitionWidth {
        /// Offending state
        state: usize,
        /// Transitions supplied
        found: usize,
        /// Category count
        expected: usize,
    },

    /// A transition targets a state that was never added
    #[error("state {state} transitions to unknown state {target}")]
    UnknownState {
        /// Source state
        state: usize,
        /// Transition target
        target: u16,
    },

    /// A category value does not fit the table
    #[error("category {category} is out of range for {cat_count} categories")]
    CategoryOutOfRange {
        /// Offending category (dictionary bit stripped)
        category: u16,
        /// Category count
        cat_count: usize,
    },

    /// A code point range is inverted or beyond U+10FFFF
    #[error("invalid code point range {start:#x}..={end:#x}")]
    InvalidRange {
        /// First code point
        start: u32,
        /// Last code point
        end: u32,
    },

    /// The compacted trie does not fit 16-bit block offsets
    #[error("category trie needs {0} data entries, at most 65536 are addressable")]
    TrieTooLarge(usize),

    /// A tag index does not fit the on-disk i16 field
    #[error("status run at {0} is not addressable by a 16-bit tag index")]
    TagIndexOverflow(usize),
}

/// Result type for load operations
pub type Result<T> = std::result::Result<T, LoadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_magic_display() {
        let err = LoadError::BadMagic {
            found: 0x1234,
            expected: 0xb1a0,
        };
        assert_eq!(err.to_string(), "bad magic number 0x1234, expected 0xb1a0");
    }

    #[test]
    fn test_section_out_of_bounds_display() {
        let err = LoadError::SectionOutOfBounds {
            section: "trie",
            offset: 100,
            length: 40,
            total: 120,
        };
        assert_eq!(
            err.to_string(),
            "trie section [100, +40) lies outside the 120-byte blob"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LoadError = io.into();
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_build_error_display() {
        let err = BuildError::UnknownState { state: 3, target: 9 };
        assert_eq!(err.to_string(), "state 3 transitions to unknown state 9");
    }
}
