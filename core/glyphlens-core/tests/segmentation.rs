use proptest::prelude::*;
use unicode_script::Script;

use glyphlens_core::script::{ScriptId, ScriptSegmentation};

/// Latin, Greek, Arabic, Hebrew and CJK letters with digits, spaces,
/// punctuation and a combining mark mixed in.
fn mixed_char() -> impl Strategy<Value = char> {
    prop_oneof![
        proptest::char::range('a', 'z'),
        proptest::char::range('\u{03B1}', '\u{03C9}'),
        proptest::char::range('\u{0627}', '\u{064A}'),
        proptest::char::range('\u{05D0}', '\u{05EA}'),
        proptest::char::range('\u{4E00}', '\u{4E20}'),
        proptest::char::range('0', '9'),
        Just(' '),
        Just(','),
        Just('\u{0301}'),
    ]
}

proptest! {
    #[test]
    fn segments_cover_text_exactly_once(chars in proptest::collection::vec(mixed_char(), 0..64)) {
        let text: String = chars.iter().collect();
        let seg = ScriptSegmentation::analyze(&text);

        prop_assert_eq!(seg.text_len() as usize, chars.len());
        let mut expected_start = 0;
        for segment in seg.segments() {
            prop_assert_eq!(segment.range.start, expected_start);
            prop_assert!(segment.range.count > 0);
            expected_start = segment.range.end();
        }
        prop_assert_eq!(expected_start as usize, chars.len());
    }

    #[test]
    fn neighbouring_segments_differ_in_script(chars in proptest::collection::vec(mixed_char(), 1..64)) {
        let text: String = chars.iter().collect();
        let seg = ScriptSegmentation::analyze(&text);

        for pair in seg.segments().windows(2) {
            prop_assert_ne!(pair[0].script, pair[1].script);
        }
        let all_neutral = chars.iter().all(|ch| ScriptId::of(*ch).is_neutral());
        prop_assert_eq!(seg.segments().iter().any(|s| s.script.is_neutral()), all_neutral);
    }

    #[test]
    fn script_at_agrees_with_segments(chars in proptest::collection::vec(mixed_char(), 1..64)) {
        let text: String = chars.iter().collect();
        let seg = ScriptSegmentation::analyze(&text);

        for segment in seg.segments() {
            for pos in segment.range.start..segment.range.end() {
                prop_assert_eq!(seg.script_at(pos), Some(segment.script));
            }
        }
        let last = seg.segments().last().map(|s| s.script);
        prop_assert_eq!(seg.script_at(seg.text_len()), last);
    }

    #[test]
    fn letters_keep_their_own_script(chars in proptest::collection::vec(mixed_char(), 1..64)) {
        let text: String = chars.iter().collect();
        let seg = ScriptSegmentation::analyze(&text);

        for (pos, ch) in (0u32..).zip(chars.iter()) {
            let own = ScriptId::of(*ch);
            if !own.is_neutral() {
                prop_assert_eq!(seg.script_at(pos), Some(own));
            }
        }
    }
}

#[test]
fn leading_neutrals_fold_into_first_run() {
    let seg = ScriptSegmentation::analyze("12 \u{05D0}\u{05D1}");
    assert_eq!(seg.segments().len(), 1);
    assert_eq!(seg.segments()[0].script, ScriptId::new(Script::Hebrew));
    assert_eq!(seg.segments()[0].range.count, 5);
}
