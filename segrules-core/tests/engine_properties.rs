//! Property tests for the token engine

use proptest::prelude::*;
use segrules_core::*;
use std::sync::Arc;

const WORD: i32 = 1;
const OTHER: i32 = 2;
const SPACE: i32 = 8;

/// Categories: 0 other, 1 letter, 2 space, 3 ideograph (dictionary).
/// Letters and ideographs form runs, spaces form runs, anything else is a
/// single-code-point token. Each token kind reports its own status run.
fn word_rules(word: &[i32], other: &[i32], space: &[i32]) -> Arc<RuleSet> {
    let mut b = RuleTableBuilder::new(4);
    b.categories_mut()
        .set_range('a' as u32, 'z' as u32, 1)
        .unwrap();
    b.categories_mut().set(' ', 2);
    b.categories_mut()
        .set_range(0x4E00, 0x9FFF, 3 | DICTIONARY_FLAG)
        .unwrap();
    let word = b.add_status_run(word);
    let other = b.add_status_run(other);
    let space = b.add_status_run(space);
    b.add_state(StateSpec::new(vec![0, 0, 0, 0]));
    b.add_state(StateSpec::new(vec![4, 2, 3, 5]));
    b.add_state(StateSpec::accepting(vec![0, 2, 0, 0]).with_tag(word));
    b.add_state(StateSpec::accepting(vec![0, 0, 3, 0]).with_tag(space));
    b.add_state(StateSpec::accepting(vec![0, 0, 0, 0]).with_tag(other));
    b.add_state(StateSpec::accepting(vec![0, 0, 0, 5]).with_tag(word));
    RuleSet::load_shared(&b.build().unwrap()).unwrap()
}

fn all_tokens(rules: Arc<RuleSet>, text: &str) -> Vec<Token> {
    TokenizerEngine::new(rules, StrCursor::new(text))
        .tokens()
        .collect()
}

fn batched_tokens(rules: Arc<RuleSet>, text: &str, batch: usize) -> Vec<Token> {
    let mut engine = TokenizerEngine::new(rules, StrCursor::new(text));
    let mut ranges = vec![TokenRange::default(); batch];
    let mut flags = vec![0i32; batch];
    let mut out = Vec::new();
    loop {
        let n = engine.tokenize(batch, &mut ranges, Some(&mut flags));
        if n == 0 {
            break;
        }
        out.extend(
            ranges[..n]
                .iter()
                .zip(&flags[..n])
                .map(|(&range, &flags)| Token { range, flags }),
        );
    }
    out
}

fn text_strategy() -> impl Strategy<Value = String> {
    "[ab .!中文]{0,48}"
}

proptest! {
    #[test]
    fn prop_every_token_advances(text in text_strategy()) {
        for token in all_tokens(word_rules(&[WORD], &[OTHER], &[SPACE]), &text) {
            prop_assert!(token.range.length > 0);
            prop_assert!(text.is_char_boundary(token.range.start));
            prop_assert!(text.is_char_boundary(token.range.end()));
        }
    }

    #[test]
    fn prop_tokens_tile_the_input(text in text_strategy()) {
        let tokens = all_tokens(word_rules(&[WORD], &[OTHER], &[SPACE]), &text);
        let mut expected_start = 0;
        for token in &tokens {
            prop_assert_eq!(token.range.start, expected_start);
            expected_start = token.range.end();
        }
        prop_assert_eq!(expected_start, text.len());
    }

    #[test]
    fn prop_suppression_only_removes_tokens(text in text_strategy()) {
        let unfiltered = all_tokens(word_rules(&[WORD], &[OTHER], &[SPACE]), &text);
        let filtered = all_tokens(word_rules(&[WORD], &[OTHER], &[SPACE, -1]), &text);
        let expected: Vec<Token> = unfiltered
            .into_iter()
            .filter(|t| t.flags != SPACE)
            .collect();
        prop_assert_eq!(filtered, expected);
    }

    #[test]
    fn prop_replay_matches_scanning(text in text_strategy(), keep in 0usize..50) {
        // Untagged grammar: scanned tokens report 0, as replayed ones do
        let rules = word_rules(&[], &[], &[]);
        let scanned = all_tokens(Arc::clone(&rules), &text);

        let mut positions = vec![0];
        positions.extend(scanned.iter().take(keep).map(|t| t.range.end()));

        let mut engine = TokenizerEngine::new(rules, StrCursor::new(&text));
        engine.attach_break_cache(BreakCache::new(positions));
        let replayed: Vec<Token> = engine.tokens().collect();
        prop_assert_eq!(replayed, scanned);
    }

    #[test]
    fn prop_batch_size_does_not_change_output(text in text_strategy(), batch in 1usize..6) {
        let rules = word_rules(&[WORD], &[OTHER], &[SPACE]);
        prop_assert_eq!(
            batched_tokens(Arc::clone(&rules), &text, batch),
            all_tokens(rules, &text)
        );
    }

    #[test]
    fn prop_terminal_token_is_last_of_call(text in text_strategy()) {
        let rules = word_rules(&[WORD], &[TERMINAL_FLAG], &[SPACE]);
        let mut engine = TokenizerEngine::new(rules, StrCursor::new(&text));
        let mut ranges = vec![TokenRange::default(); 64];
        let mut flags = vec![0i32; 64];
        let n = engine.tokenize(64, &mut ranges, Some(&mut flags));
        if let Some(first_terminal) = flags[..n].iter().position(|&f| is_terminal(f)) {
            prop_assert_eq!(first_terminal, n - 1);
            prop_assert!(n < 64);
        }
    }

    #[test]
    fn prop_dictionary_refinement_keeps_progress(text in text_strategy(), width in 1usize..7) {
        let rules = word_rules(&[WORD], &[OTHER], &[SPACE]);
        let mut engine = TokenizerEngine::new(rules, StrCursor::new(&text))
            .with_dictionary(Arc::new(FixedWidthSegmenter::new(width)));
        let mut end = 0;
        for token in engine.tokens() {
            prop_assert_eq!(token.range.start, end);
            prop_assert!(token.range.length > 0);
            end = token.range.end();
        }
        prop_assert_eq!(end, text.len());
    }
}
