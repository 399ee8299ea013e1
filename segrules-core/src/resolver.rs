//! Per-state flag resolution
//!
//! Each accepting, tagged state gets one flags word derived from its status
//! run. Positive values accumulate with OR, a zero ends the run, and a
//! negative value replaces everything accumulated so far and ends the run.

use crate::status::{StatusTable, SUPPRESSED, TERMINAL_FLAG};
use crate::table::StateTable;

/// One resolved flags word per DFA state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFlags {
    flags: Vec<i32>,
}

impl ResolvedFlags {
    /// Resolve flags for every state of `table`
    pub fn resolve(table: &StateTable, status: &StatusTable) -> Self {
        let flags = table
            .rows()
            .map(|(_, row)| {
                if !row.is_accepting() || row.tag_index == 0 {
                    return 0;
                }
                usize::try_from(row.tag_index)
                    .ok()
                    .and_then(|tag| status.run(tag))
                    .map_or(0, fold_run)
            })
            .collect();
        Self { flags }
    }

    /// Flags of `state`
    #[inline]
    pub fn get(&self, state: u16) -> i32 {
        self.flags[usize::from(state)]
    }

    /// Number of states covered
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no states are covered
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// All flags, indexed by state id
    pub fn as_slice(&self) -> &[i32] {
        &self.flags
    }

    /// States whose tokens are suppressed
    pub fn suppressed_states(&self) -> impl Iterator<Item = u16> + '_ {
        self.states_where(|f| f == SUPPRESSED)
    }

    /// States whose tokens end a `tokenize` call
    ///
    /// Suppressed states never end a call even though -1 has every bit set.
    pub fn terminal_states(&self) -> impl Iterator<Item = u16> + '_ {
        self.states_where(|f| f != SUPPRESSED && is_terminal(f))
    }

    fn states_where(&self, pred: impl Fn(i32) -> bool + 'static) -> impl Iterator<Item = u16> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(move |&(_, &f)| pred(f))
            .filter_map(|(s, _)| u16::try_from(s).ok())
    }
}

/// Whether a flags word carries the terminal bit
#[inline]
pub fn is_terminal(flags: i32) -> bool {
    flags & TERMINAL_FLAG != 0
}

fn fold_run(run: &[i32]) -> i32 {
    let mut flags = 0;
    for &value in run {
        match value {
            0 => break,
            v if v > 0 => flags |= v,
            v => return v,
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_values_accumulate() {
        assert_eq!(fold_run(&[1, 4, 16]), 21);
    }

    #[test]
    fn test_zero_ends_run() {
        assert_eq!(fold_run(&[2, 0, 8]), 2);
    }

    #[test]
    fn test_negative_overrides_and_stops() {
        assert_eq!(fold_run(&[4, -1]), -1);
        assert_eq!(fold_run(&[4, -1, 8]), -1);
        assert_eq!(fold_run(&[-5, 4]), -5);
    }

    #[test]
    fn test_terminal_bit() {
        assert!(is_terminal(TERMINAL_FLAG | 3));
        assert!(!is_terminal(3));
        // -1 sets every bit, terminal included; suppression is checked first
        assert!(is_terminal(SUPPRESSED));
    }

    #[test]
    fn test_state_queries() {
        let resolved = ResolvedFlags {
            flags: vec![0, 0, TERMINAL_FLAG | 1, SUPPRESSED, 4],
        };
        assert_eq!(resolved.terminal_states().collect::<Vec<_>>(), vec![2]);
        assert_eq!(resolved.suppressed_states().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_empty_run_is_zero() {
        assert_eq!(fold_run(&[]), 0);
    }
}
