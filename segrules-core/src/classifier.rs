//! Code point classification into DFA categories

use crate::trie::CategoryTrie;

/// Bit of a raw category value marking a dictionary code point
pub const DICTIONARY_FLAG: u16 = 0x4000;

/// Number of code points served by the fast table
pub const LATIN1_LEN: usize = 256;

/// Maps code points to category ids
///
/// Code points below 256 are answered from a table sampled from the trie
/// when the classifier is built; everything else goes through the trie.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    latin1: [u16; LATIN1_LEN],
    trie: CategoryTrie,
}

impl CategoryClassifier {
    /// Build the classifier, sampling the trie over 0..=255
    pub fn new(trie: CategoryTrie) -> Self {
        let mut latin1 = [0u16; LATIN1_LEN];
        for (cp, slot) in latin1.iter_mut().enumerate() {
            *slot = trie.get(cp as u32);
        }
        Self { latin1, trie }
    }

    /// Category of `c` and whether it is a dictionary code point
    ///
    /// The dictionary bit is always stripped from the returned category.
    #[inline]
    pub fn classify(&self, c: char) -> (u16, bool) {
        let raw = self.raw_category(c);
        (raw & !DICTIONARY_FLAG, raw & DICTIONARY_FLAG != 0)
    }

    /// Raw category value, dictionary bit included
    #[inline]
    pub fn raw_category(&self, c: char) -> u16 {
        let cp = u32::from(c);
        if cp < LATIN1_LEN as u32 {
            self.latin1[cp as usize]
        } else {
            self.trie.get(cp)
        }
    }

    /// Underlying trie
    pub fn trie(&self) -> &CategoryTrie {
        &self.trie
    }
}
