//! Hand-off to dictionary-based segmentation
//!
//! Scripts written without separators (Thai, Khmer, CJK ideographs, ...)
//! cannot be split by the DFA alone. Rule tables flag their code points as
//! dictionary characters; when a token scan sees any, the engine asks a
//! [`DictionarySegmenter`] where the token should really end.

/// Refines a DFA candidate boundary using dictionary knowledge
pub trait DictionarySegmenter: Send + Sync {
    /// Return the refined end of the token starting at `start`
    ///
    /// `candidate_end` is where the DFA would end the token. Results before
    /// `start` are clamped by the engine.
    fn refine(&self, start: usize, candidate_end: usize) -> usize;
}

impl<F> DictionarySegmenter for F
where
    F: Fn(usize, usize) -> usize + Send + Sync,
{
    fn refine(&self, start: usize, candidate_end: usize) -> usize {
        self(start, candidate_end)
    }
}

/// Segmenter that splits dictionary runs into fixed-width pieces
///
/// Useful as a stand-in when no dictionary is available: each refined token
/// spans at most `width` native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthSegmenter {
    width: usize,
}

impl FixedWidthSegmenter {
    /// Split into pieces of at most `width` units (minimum 1)
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }
}

impl DictionarySegmenter for FixedWidthSegmenter {
    fn refine(&self, start: usize, candidate_end: usize) -> usize {
        candidate_end.min(start + self.width)
    }
}
