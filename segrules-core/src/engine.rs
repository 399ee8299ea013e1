//! DFA token engine
//!
//! Each token is found by running the forward DFA from START over the code
//! points following the last boundary. The scan stops when the DFA reaches
//! STOP or the input ends; the token ends at the last position where an
//! accepting row was entered.
//!
//! Policies layered on top of the bare scan:
//! - a [`BreakCache`] can supply token ends instead of scanning, until it
//!   runs out, after which it is dropped for good;
//! - scans that touched dictionary code points are handed to a
//!   [`DictionarySegmenter`] for a refined end;
//! - a scan that ends where it started is forced one code point forward and
//!   reported with flags 0, so malformed grammars cannot stall the engine;
//! - tokens resolving to flags -1 are skipped without being reported;
//! - a token carrying [`TERMINAL_FLAG`](crate::status::TERMINAL_FLAG) ends
//!   the call after being written.

use crate::cache::BreakCache;
use crate::cursor::TextCursor;
use crate::dictionary::DictionarySegmenter;
use crate::resolver::is_terminal;
use crate::rules::RuleSet;
use crate::status::SUPPRESSED;
use crate::table::{START_STATE, STOP_STATE};
use std::sync::Arc;

/// Half-open token range in native offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct TokenRange {
    /// First native offset of the token
    pub start: usize,
    /// Length in native units
    pub length: usize,
}

impl TokenRange {
    /// One past the last native offset
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// As a standard range
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// A reported token with its resolved flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// Where the token lies
    pub range: TokenRange,
    /// Flags resolved for the accepting state that ended it
    pub flags: i32,
}

impl Token {
    /// Whether this token ends a `tokenize` call
    pub fn is_terminal(&self) -> bool {
        is_terminal(self.flags)
    }
}

/// Token engine bound to one cursor
///
/// The rule set is shared; cursor, boundary and replay state belong to the
/// engine, so one engine serves one caller at a time.
pub struct TokenizerEngine<C> {
    rules: Arc<RuleSet>,
    cursor: C,
    prev: usize,
    dictionary_char_count: usize,
    break_cache: Option<BreakCache>,
    dictionary: Option<Arc<dyn DictionarySegmenter>>,
}

impl<C: TextCursor> TokenizerEngine<C> {
    /// Engine starting at the cursor's current offset
    pub fn new(rules: Arc<RuleSet>, cursor: C) -> Self {
        let prev = cursor.offset();
        Self {
            rules,
            cursor,
            prev,
            dictionary_char_count: 0,
            break_cache: None,
            dictionary: None,
        }
    }

    /// Attach a dictionary segmenter
    pub fn with_dictionary(mut self, dictionary: Arc<dyn DictionarySegmenter>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Replace or remove the dictionary segmenter
    pub fn set_dictionary(&mut self, dictionary: Option<Arc<dyn DictionarySegmenter>>) {
        self.dictionary = dictionary;
    }

    /// Replay `cache` for the following tokens
    pub fn attach_break_cache(&mut self, cache: BreakCache) {
        self.break_cache = Some(cache);
    }

    /// Drop the break cache, returning it if one was attached
    pub fn detach_break_cache(&mut self) -> Option<BreakCache> {
        self.break_cache.take()
    }

    /// Whether a break cache is attached
    pub fn has_break_cache(&self) -> bool {
        self.break_cache.is_some()
    }

    /// Restart scanning at `offset`
    ///
    /// The offset snaps to a code point start. Any attached break cache
    /// describes the old position and is dropped.
    pub fn set_position(&mut self, offset: usize) {
        self.cursor.set_offset(offset);
        self.prev = self.cursor.offset();
        self.break_cache = None;
    }

    /// Last confirmed boundary
    pub fn position(&self) -> usize {
        self.prev
    }

    /// Dictionary code points seen by the most recent token scan
    pub fn dictionary_char_count(&self) -> usize {
        self.dictionary_char_count
    }

    /// Shared rule set
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    /// The cursor
    pub fn cursor(&self) -> &C {
        &self.cursor
    }

    /// Give back the cursor
    pub fn into_cursor(self) -> C {
        self.cursor
    }

    /// Scan up to `max_tokens` tokens into caller-owned storage
    ///
    /// `max_tokens` is clamped to the capacity of `out_ranges` and, when
    /// given, `out_flags`. Returns the number of tokens written; fewer than
    /// `max_tokens` means the input ran out or a terminal token was written.
    pub fn tokenize(
        &mut self,
        max_tokens: usize,
        out_ranges: &mut [TokenRange],
        mut out_flags: Option<&mut [i32]>,
    ) -> usize {
        let mut max_tokens = max_tokens.min(out_ranges.len());
        if let Some(flags) = out_flags.as_deref() {
            max_tokens = max_tokens.min(flags.len());
        }

        let rules = Arc::clone(&self.rules);
        let table = rules.forward_table();
        let classifier = rules.classifier();
        let resolved = rules.resolved_flags();

        let mut count = 0;
        while count < max_tokens {
            let Some(mut c) = self.cursor.next_code_point() else {
                break;
            };

            let mut state = START_STATE;
            let mut result = self.prev;
            let mut last_accepting = STOP_STATE;
            self.dictionary_char_count = 0;

            let mut replayed = false;
            if let Some(cache) = self.break_cache.as_mut() {
                match cache.advance() {
                    Some(position) => {
                        result = position;
                        replayed = true;
                    }
                    None => self.break_cache = None,
                }
            }

            if !replayed {
                loop {
                    let (category, dictionary) = classifier.classify(c);
                    if dictionary {
                        self.dictionary_char_count += 1;
                    }
                    state = table.next_state(state, category);
                    if table.row(state).is_accepting() {
                        result = self.cursor.offset();
                        last_accepting = state;
                    }
                    if state == STOP_STATE {
                        break;
                    }
                    match self.cursor.next_code_point() {
                        Some(next) => c = next,
                        None => break,
                    }
                }

                if self.dictionary_char_count > 0 {
                    if let Some(dictionary) = &self.dictionary {
                        result = dictionary.refine(self.prev, result);
                    }
                }
            }

            self.cursor.set_offset(result.max(self.prev));
            result = self.cursor.offset();

            let mut forced_zero = false;
            if result == self.prev {
                self.cursor.set_offset(self.prev);
                self.cursor.next_code_point();
                result = self.cursor.offset();
                forced_zero = true;
            }

            let flags = if forced_zero {
                0
            } else {
                resolved.get(last_accepting)
            };

            if flags == SUPPRESSED {
                self.prev = result;
                continue;
            }

            let range = TokenRange {
                start: self.prev,
                length: result - self.prev,
            };
            out_ranges[count] = range;
            if let Some(out) = out_flags.as_deref_mut() {
                out[count] = flags;
            }
            count += 1;
            self.prev = result;

            #[cfg(debug_assertions)]
            tracing::trace!(
                start = range.start,
                length = range.length,
                flags,
                replayed,
                forced_zero,
                "token"
            );

            if is_terminal(flags) {
                break;
            }
        }

        count
    }

    /// Iterate over tokens one at a time
    ///
    /// The iterator ends at the end of input or right after a terminal token.
    pub fn tokens(&mut self) -> Tokens<'_, C> {
        Tokens {
            engine: self,
            done: false,
        }
    }
}

impl<C> std::fmt::Debug for TokenizerEngine<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenizerEngine")
            .field("prev", &self.prev)
            .field("dictionary_char_count", &self.dictionary_char_count)
            .field("break_cache", &self.break_cache)
            .field("has_dictionary", &self.dictionary.is_some())
            .finish_non_exhaustive()
    }
}

/// Iterator returned by [`TokenizerEngine::tokens`]
pub struct Tokens<'e, C> {
    engine: &'e mut TokenizerEngine<C>,
    done: bool,
}

impl<C: TextCursor> Iterator for Tokens<'_, C> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let mut range = [TokenRange::default()];
        let mut flags = [0i32];
        if self.engine.tokenize(1, &mut range, Some(&mut flags)) == 0 {
            self.done = true;
            return None;
        }
        let token = Token {
            range: range[0],
            flags: flags[0],
        };
        if token.is_terminal() {
            self.done = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{RuleTableBuilder, StateSpec};
    use crate::classifier::DICTIONARY_FLAG;
    use crate::cursor::{StrCursor, Utf16Cursor};
    use crate::status::TERMINAL_FLAG;

    fn load(b: &RuleTableBuilder) -> Arc<RuleSet> {
        RuleSet::load_shared(&b.build().unwrap()).unwrap()
    }

    /// START sends everything to STOP; STOP's row decides acceptance
    fn two_state(stop_accepting: bool) -> Arc<RuleSet> {
        let mut b = RuleTableBuilder::new(1);
        b.add_state(if stop_accepting {
            StateSpec::accepting(vec![0])
        } else {
            StateSpec::new(vec![0])
        });
        b.add_state(StateSpec::new(vec![0]));
        load(&b)
    }

    /// Categories: 0 other, 1 letter, 2 space.
    /// Letter runs form words (flags 1); single other chars get flags 2;
    /// space runs resolve to whatever `space_run` folds to.
    fn words(space_run: &[i32]) -> Arc<RuleSet> {
        let mut b = RuleTableBuilder::new(3);
        b.categories_mut().set_range('a' as u32, 'z' as u32, 1).unwrap();
        b.categories_mut().set(' ', 2);
        let word = b.add_status_run(&[1]);
        let other = b.add_status_run(&[2]);
        let space = b.add_status_run(space_run);
        b.add_state(StateSpec::new(vec![0, 0, 0])); // 0 STOP
        b.add_state(StateSpec::new(vec![4, 2, 3])); // 1 START
        b.add_state(StateSpec::accepting(vec![0, 2, 0]).with_tag(word)); // 2 in word
        b.add_state(StateSpec::accepting(vec![0, 0, 3]).with_tag(space)); // 3 in spaces
        b.add_state(StateSpec::accepting(vec![0, 0, 0]).with_tag(other)); // 4 other
        load(&b)
    }

    fn collect(engine: &mut TokenizerEngine<StrCursor<'_>>) -> Vec<(usize, usize, i32)> {
        engine
            .tokens()
            .map(|t| (t.range.start, t.range.length, t.flags))
            .collect()
    }

    #[test]
    fn test_accepting_stop_yields_single_code_points() {
        let mut engine = TokenizerEngine::new(two_state(true), StrCursor::new("ab"));
        let mut ranges = [TokenRange::default(); 2];
        let mut flags = [7i32; 2];
        let n = engine.tokenize(2, &mut ranges, Some(&mut flags));
        assert_eq!(n, 2);
        assert_eq!(ranges[0], TokenRange { start: 0, length: 1 });
        assert_eq!(ranges[1], TokenRange { start: 1, length: 1 });
        assert_eq!(flags, [0, 0]);
    }

    #[test]
    fn test_zero_advance_guard_forces_progress() {
        let mut engine = TokenizerEngine::new(two_state(false), StrCursor::new("ab"));
        let mut ranges = [TokenRange::default(); 2];
        let mut flags = [7i32; 2];
        let n = engine.tokenize(2, &mut ranges, Some(&mut flags));
        assert_eq!(n, 2);
        assert_eq!(ranges[0], TokenRange { start: 0, length: 1 });
        assert_eq!(ranges[1], TokenRange { start: 1, length: 1 });
        assert_eq!(flags, [0, 0]);
    }

    #[test]
    fn test_words_and_spaces() {
        let mut engine = TokenizerEngine::new(words(&[8]), StrCursor::new("ab  cd!"));
        assert_eq!(
            collect(&mut engine),
            vec![(0, 2, 1), (2, 2, 8), (4, 2, 1), (6, 1, 2)]
        );
    }

    #[test]
    fn test_suppressed_tokens_are_skipped() {
        let mut engine = TokenizerEngine::new(words(&[4, -1]), StrCursor::new("ab  cd"));
        let mut ranges = [TokenRange::default(); 8];
        let n = engine.tokenize(8, &mut ranges, None);
        assert_eq!(n, 2);
        assert_eq!(ranges[0], TokenRange { start: 0, length: 2 });
        assert_eq!(ranges[1], TokenRange { start: 4, length: 2 });
    }

    #[test]
    fn test_suppression_does_not_count_against_max() {
        let mut engine = TokenizerEngine::new(words(&[-1]), StrCursor::new("a b c"));
        let mut ranges = [TokenRange::default(); 2];
        assert_eq!(engine.tokenize(2, &mut ranges, None), 2);
        assert_eq!(ranges[1], TokenRange { start: 2, length: 1 });
        assert_eq!(engine.position(), 3);
    }

    #[test]
    fn test_terminal_token_ends_call() {
        let mut engine =
            TokenizerEngine::new(words(&[TERMINAL_FLAG]), StrCursor::new("ab cd ef"));
        let mut ranges = [TokenRange::default(); 10];
        let mut flags = [0i32; 10];
        let n = engine.tokenize(10, &mut ranges, Some(&mut flags));
        assert_eq!(n, 2);
        assert_eq!(ranges[1], TokenRange { start: 2, length: 1 });
        assert_eq!(flags[1], TERMINAL_FLAG);

        // A later call resumes after the terminal token
        let n = engine.tokenize(10, &mut ranges, Some(&mut flags));
        assert_eq!(n, 2);
        assert_eq!(ranges[0], TokenRange { start: 3, length: 2 });
    }

    #[test]
    fn test_max_tokens_clamped_to_output() {
        let mut engine = TokenizerEngine::new(two_state(true), StrCursor::new("abcdef"));
        let mut ranges = [TokenRange::default(); 3];
        let mut flags = [0i32; 2];
        assert_eq!(engine.tokenize(100, &mut ranges, Some(&mut flags)), 2);
        assert_eq!(engine.tokenize(0, &mut ranges, None), 0);
        assert_eq!(engine.position(), 2);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let mut engine = TokenizerEngine::new(words(&[1]), StrCursor::new(""));
        let mut ranges = [TokenRange::default(); 4];
        assert_eq!(engine.tokenize(4, &mut ranges, None), 0);
    }

    #[test]
    fn test_break_cache_replays_then_detaches() {
        let mut engine = TokenizerEngine::new(words(&[8]), StrCursor::new("ab cd ef"));
        engine.attach_break_cache(BreakCache::new(vec![0, 2, 3]));
        let tokens = collect(&mut engine);
        // Replayed tokens report the flags of state 0
        assert_eq!(
            tokens,
            vec![(0, 2, 0), (2, 1, 0), (3, 2, 1), (5, 1, 8), (6, 2, 1)]
        );
        assert!(!engine.has_break_cache());
    }

    #[test]
    fn test_set_position_restarts_and_drops_cache() {
        let mut engine = TokenizerEngine::new(words(&[8]), StrCursor::new("ab cd"));
        engine.attach_break_cache(BreakCache::new(vec![0, 5]));
        engine.set_position(3);
        assert!(!engine.has_break_cache());
        assert_eq!(collect(&mut engine), vec![(3, 2, 1)]);
    }

    #[test]
    fn test_dictionary_refines_scan() {
        let mut b = RuleTableBuilder::new(2);
        b.categories_mut()
            .set_range(0x4E00, 0x9FFF, 1 | DICTIONARY_FLAG)
            .unwrap();
        let run = b.add_status_run(&[200]);
        b.add_state(StateSpec::new(vec![0, 0]));
        b.add_state(StateSpec::new(vec![3, 2]));
        b.add_state(StateSpec::accepting(vec![0, 2]).with_tag(run));
        b.add_state(StateSpec::accepting(vec![0, 0]));
        let rules = load(&b);

        let text = "中文字符a";
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);
        let dictionary = move |start: usize, end: usize| {
            seen.lock().unwrap().push((start, end));
            (start + 6).min(end)
        };
        let mut engine = TokenizerEngine::new(rules, StrCursor::new(text))
            .with_dictionary(Arc::new(dictionary));
        let tokens = collect(&mut engine);

        assert_eq!(tokens, vec![(0, 6, 200), (6, 6, 200), (12, 1, 0)]);
        assert_eq!(*calls.lock().unwrap(), vec![(0, 12), (6, 12)]);
        assert_eq!(engine.dictionary_char_count(), 0);
    }

    #[test]
    fn test_dictionary_result_before_start_is_clamped() {
        let mut b = RuleTableBuilder::new(1);
        b.categories_mut().set_range(0, 0x10FFFF, DICTIONARY_FLAG).unwrap();
        b.add_state(StateSpec::accepting(vec![0]));
        b.add_state(StateSpec::new(vec![0]));
        let mut engine = TokenizerEngine::new(load(&b), StrCursor::new("xy"))
            .with_dictionary(Arc::new(|_: usize, _: usize| -> usize { 0 }));
        let tokens = collect(&mut engine);
        assert_eq!(tokens, vec![(0, 1, 0), (1, 1, 0)]);
        assert_eq!(engine.dictionary_char_count(), 1);
    }

    #[test]
    fn test_utf16_offsets() {
        let units: Vec<u16> = "ab 😀".encode_utf16().collect();
        let mut engine = TokenizerEngine::new(words(&[8]), Utf16Cursor::new(&units));
        let tokens: Vec<_> = engine.tokens().map(|t| t.range.as_range()).collect();
        assert_eq!(tokens, vec![0..2, 2..3, 3..5]);
    }

    #[test]
    fn test_token_range_helpers() {
        let range = TokenRange { start: 4, length: 3 };
        assert_eq!(range.end(), 7);
        assert_eq!(range.as_range(), 4..7);
        let token = Token {
            range,
            flags: TERMINAL_FLAG | 1,
        };
        assert!(token.is_terminal());
    }
}
