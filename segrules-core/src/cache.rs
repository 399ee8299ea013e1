//! Replay of previously computed break positions

/// Sequential list of boundaries computed by an earlier pass
///
/// Index 0 holds the boundary the engine currently sits on; each replayed
/// token ends at the next entry. There is no seeking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakCache {
    positions: Vec<usize>,
    index: usize,
}

impl BreakCache {
    /// Cache starting at `positions[0]`
    pub fn new(positions: Vec<usize>) -> Self {
        Self {
            positions,
            index: 0,
        }
    }

    /// Advance and return the next cached boundary
    ///
    /// Returns `None` once the last position has been replayed.
    pub fn advance(&mut self) -> Option<usize> {
        if self.index + 1 >= self.positions.len() {
            return None;
        }
        self.index += 1;
        Some(self.positions[self.index])
    }

    /// Whether every position has been replayed
    pub fn is_exhausted(&self) -> bool {
        self.index + 1 >= self.positions.len()
    }

    /// Boundaries not yet replayed
    pub fn remaining(&self) -> usize {
        self.positions.len().saturating_sub(self.index + 1)
    }
}
