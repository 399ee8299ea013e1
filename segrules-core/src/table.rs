//! DFA state table
//!
//! On disk, rows are strided through a flat byte buffer by `rowLength`
//! because their width depends on the category count. At load time the rows
//! are decoded into typed storage so the scanning loop indexes plain slices.

use crate::error::{LoadError, Result};
use crate::header::{ensure_len, read_i16, read_u16, read_u32};

/// Terminal state: reaching it ends the current token scan
pub const STOP_STATE: u16 = 0;

/// Initial state of every token scan
pub const START_STATE: u16 = 1;

/// `accepting` value of an unconditionally accepting row
pub const ACCEPTING: i16 = -1;

/// Largest state count addressable by u16 transitions
pub const MAX_STATES: usize = u16::MAX as usize + 1;

/// Size of the state table preamble in bytes
pub const TABLE_HEADER_SIZE: usize = 16;

/// Size of the fixed part of a row in bytes
pub const ROW_HEADER_SIZE: usize = 8;

/// Row length implied by a category count
pub const fn row_length(cat_count: usize) -> usize {
    ROW_HEADER_SIZE + 2 * cat_count
}

/// Borrowed view of one decoded row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRow<'a> {
    /// 0 = not accepting, -1 = unconditional accept
    pub accepting: i16,
    /// Lookahead marker, carried but not interpreted
    pub look_ahead: i16,
    /// 0 = no tag, otherwise an index into the status table
    pub tag_index: i16,
    /// Next state per category, `cat_count` entries
    pub next_states: &'a [u16],
}

impl StateRow<'_> {
    /// Whether reaching this row confirms a match
    #[inline]
    pub fn is_accepting(&self) -> bool {
        self.accepting == ACCEPTING
    }
}

/// Decoded forward state table
#[derive(Debug, Clone)]
pub struct StateTable {
    num_states: usize,
    cat_count: usize,
    flags: u32,
    accepting: Vec<i16>,
    look_ahead: Vec<i16>,
    tag_index: Vec<i16>,
    next: Vec<u16>,
}

impl StateTable {
    /// Decode and validate a state table section
    ///
    /// Every transition must name an existing state. Tag indices are checked
    /// against the status table by the rule set loader.
    pub fn parse(data: &[u8], cat_count: usize) -> Result<Self> {
        ensure_len(data, TABLE_HEADER_SIZE, "state table header")?;

        let num_states = read_u32(data, 0) as usize;
        let row_len = read_u32(data, 4) as usize;
        let flags = read_u32(data, 8);

        let expected = row_length(cat_count);
        if row_len != expected {
            return Err(LoadError::RowLengthMismatch {
                found: row_len,
                expected,
                cat_count,
            });
        }
        if num_states < 2 {
            return Err(LoadError::TooFewStates(num_states));
        }
        if num_states > MAX_STATES {
            return Err(LoadError::TooManyStates(num_states));
        }

        let rows_len = num_states
            .checked_mul(row_len)
            .and_then(|n| n.checked_add(TABLE_HEADER_SIZE))
            .ok_or(LoadError::Truncated {
                what: "state rows",
                needed: usize::MAX,
                available: data.len(),
            })?;
        ensure_len(data, rows_len, "state rows")?;

        let mut accepting = Vec::with_capacity(num_states);
        let mut look_ahead = Vec::with_capacity(num_states);
        let mut tag_index = Vec::with_capacity(num_states);
        let mut next = Vec::with_capacity(num_states * cat_count);

        for state in 0..num_states {
            let row = TABLE_HEADER_SIZE + state * row_len;
            accepting.push(read_i16(data, row));
            look_ahead.push(read_i16(data, row + 2));
            tag_index.push(read_i16(data, row + 4));
            for category in 0..cat_count {
                let target = read_u16(data, row + ROW_HEADER_SIZE + 2 * category);
                if usize::from(target) >= num_states {
                    return Err(LoadError::InvalidNextState {
                        state,
                        category,
                        target,
                        num_states,
                    });
                }
                next.push(target);
            }
        }

        Ok(Self {
            num_states,
            cat_count,
            flags,
            accepting,
            look_ahead,
            tag_index,
            next,
        })
    }

    /// Number of states, STOP and START included
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Number of categories (transition columns)
    pub fn cat_count(&self) -> usize {
        self.cat_count
    }

    /// On-disk row length in bytes
    pub fn row_length(&self) -> usize {
        row_length(self.cat_count)
    }

    /// Table flags word, carried but not interpreted
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Typed view of one row
    ///
    /// # Panics
    ///
    /// Panics if `state` is not a valid state id.
    #[inline]
    pub fn row(&self, state: u16) -> StateRow<'_> {
        let s = usize::from(state);
        let start = s * self.cat_count;
        StateRow {
            accepting: self.accepting[s],
            look_ahead: self.look_ahead[s],
            tag_index: self.tag_index[s],
            next_states: &self.next[start..start + self.cat_count],
        }
    }

    /// Transition from `state` on `category`
    #[inline]
    pub fn next_state(&self, state: u16, category: u16) -> u16 {
        self.next[usize::from(state) * self.cat_count + usize::from(category)]
    }

    /// Iterate over all rows with their state ids
    pub fn rows(&self) -> impl Iterator<Item = (u16, StateRow<'_>)> + '_ {
        (0..self.num_states)
            .map_while(|s| u16::try_from(s).ok())
            .map(move |s| (s, self.row(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(rows: &[(i16, i16, &[u16])], cat_count: usize) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(rows.len() as u32).to_le_bytes());
        data.extend_from_slice(&(row_length(cat_count) as u32).to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        for (accepting, tag, next) in rows {
            data.extend_from_slice(&accepting.to_le_bytes());
            data.extend_from_slice(&0i16.to_le_bytes());
            data.extend_from_slice(&tag.to_le_bytes());
            data.extend_from_slice(&0u16.to_le_bytes());
            for n in next.iter() {
                data.extend_from_slice(&n.to_le_bytes());
            }
        }
        data
    }

    #[test]
    fn test_rows_decode_to_typed_views() {
        let data = encode(&[(0, 0, &[0, 0]), (0, 0, &[2, 0]), (-1, 3, &[2, 0])], 2);
        let table = StateTable::parse(&data, 2).unwrap();

        assert_eq!(table.num_states(), 3);
        assert_eq!(table.row_length(), 12);

        let row = table.row(2);
        assert!(row.is_accepting());
        assert_eq!(row.tag_index, 3);
        assert_eq!(row.next_states, &[2, 0]);
        assert_eq!(table.next_state(START_STATE, 0), 2);
        assert_eq!(table.next_state(START_STATE, 1), STOP_STATE);
    }

    #[test]
    fn test_out_of_range_transition_rejected() {
        let data = encode(&[(0, 0, &[0]), (0, 0, &[5])], 1);
        let err = StateTable::parse(&data, 1).unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidNextState {
                state: 1,
                target: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_row_length_must_match_categories() {
        let data = encode(&[(0, 0, &[0, 0]), (0, 0, &[0, 0])], 2);
        let err = StateTable::parse(&data, 3).unwrap_err();
        assert!(matches!(err, LoadError::RowLengthMismatch { expected: 14, .. }));
    }

    #[test]
    fn test_truncated_rows_rejected() {
        let mut data = encode(&[(0, 0, &[0]), (0, 0, &[1])], 1);
        data.truncate(data.len() - 1);
        let err = StateTable::parse(&data, 1).unwrap_err();
        assert!(matches!(err, LoadError::Truncated { what: "state rows", .. }));
    }

    #[test]
    fn test_unaddressable_state_count_rejected() {
        let mut data = Vec::new();
        data.extend_from_slice(&((MAX_STATES + 1) as u32).to_le_bytes());
        data.extend_from_slice(&(row_length(1) as u32).to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        assert!(matches!(
            StateTable::parse(&data, 1).unwrap_err(),
            LoadError::TooManyStates(65537)
        ));
    }

    #[test]
    fn test_largest_state_count_enumerates_every_id() {
        let row: (i16, i16, &[u16]) = (0, 0, &[0]);
        let rows = vec![row; MAX_STATES];
        let table = StateTable::parse(&encode(&rows, 1), 1).unwrap();
        assert_eq!(table.rows().count(), MAX_STATES);
        assert_eq!(table.rows().last().map(|(s, _)| s), Some(u16::MAX));
    }

    #[test]
    fn test_single_state_rejected() {
        let data = encode(&[(0, 0, &[0])], 1);
        assert!(matches!(
            StateTable::parse(&data, 1).unwrap_err(),
            LoadError::TooFewStates(1)
        ));
    }
}
