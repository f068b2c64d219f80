//! Undo/redo property tests
//!
//! Drive the editing facade with random request streams and check the
//! history contract against a plain `Vec<char>` model.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use seqedit::{EditorConfig, RecordGranularity, TextEditor, TextMirror};

#[derive(Debug, Clone)]
enum Request {
    Insert { pos: usize, text: String },
    Delete { pos: usize, len: usize },
    Replace { pos: usize, len: usize, text: String },
}

fn text_strategy() -> impl Strategy<Value = String> {
    let ch = prop_oneof![Just('a'), Just('b'), Just(' '), Just('é'), Just('\n')];
    proptest::collection::vec(ch, 0..6).prop_map(|chars| chars.into_iter().collect())
}

fn request_strategy() -> impl Strategy<Value = Request> {
    prop_oneof![
        (0usize..24, text_strategy()).prop_map(|(pos, text)| Request::Insert { pos, text }),
        (0usize..24, 0usize..5).prop_map(|(pos, len)| Request::Delete { pos, len }),
        (0usize..24, 0usize..5, text_strategy())
            .prop_map(|(pos, len, text)| Request::Replace { pos, len, text }),
    ]
}

fn granularity_strategy() -> impl Strategy<Value = RecordGranularity> {
    prop_oneof![
        Just(RecordGranularity::PerRequest),
        Just(RecordGranularity::PerCharacter)
    ]
}

/// Applies the request to the model, returning whether it changed anything.
fn apply_model(model: &mut Vec<char>, request: &Request) -> bool {
    match request {
        Request::Insert { pos, text } => {
            if text.is_empty() || *pos > model.len() {
                return false;
            }
            model.splice(*pos..*pos, text.chars());
            true
        }
        Request::Delete { pos, len } => {
            if *pos > model.len() {
                return false;
            }
            let end = (*pos + *len).min(model.len());
            model.drain(*pos..end).count() > 0
        }
        Request::Replace { pos, len, text } => {
            if *pos > model.len() {
                return false;
            }
            let end = (*pos + *len).min(model.len());
            if end == *pos && text.is_empty() {
                return false;
            }
            model.splice(*pos..end, text.chars());
            true
        }
    }
}

fn apply_editor(editor: &mut TextEditor, request: &Request) -> bool {
    match request {
        Request::Insert { pos, text } => editor.insert_text(*pos, text).unwrap(),
        Request::Delete { pos, len } => editor.delete_range(*pos, *len).unwrap(),
        Request::Replace { pos, len, text } => editor.replace_range(*pos, *len, text).unwrap(),
    }
}

fn to_string(chars: &[char]) -> String {
    chars.iter().collect()
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn edits_match_model_and_round_trip(
        initial in "[a-z ]{0,12}",
        granularity in granularity_strategy(),
        requests in proptest::collection::vec(request_strategy(), 0..24)
    ) {
        let config = EditorConfig::new().with_granularity(granularity);
        let mut editor = TextEditor::with_config(config).unwrap();
        let mirror = TextMirror::new();
        editor.add_change_listener(Box::new(mirror.clone()));
        editor.load_content(&initial);

        let mut model: Vec<char> = initial.chars().collect();
        for request in &requests {
            let expected = apply_model(&mut model, request);
            prop_assert_eq!(apply_editor(&mut editor, request), expected);
            prop_assert_eq!(editor.len_chars(), model.len());
            prop_assert_eq!(mirror.text(), editor.get_text());
        }

        let edited = to_string(&model);
        prop_assert_eq!(editor.get_text(), edited.clone());

        let mut undone = 0;
        while editor.undo().unwrap() {
            undone += 1;
            prop_assert_eq!(mirror.text(), editor.get_text());
        }
        prop_assert_eq!(editor.get_text(), initial);

        for _ in 0..undone {
            prop_assert!(editor.redo().unwrap());
        }
        prop_assert!(!editor.redo().unwrap());
        prop_assert_eq!(editor.get_text(), edited);
        prop_assert_eq!(mirror.text(), editor.get_text());
    }

    #[test]
    fn empty_stack_operations_change_nothing(
        initial in "[a-z]{0,8}",
        requests in proptest::collection::vec(request_strategy(), 0..8)
    ) {
        let mut editor = TextEditor::new();
        editor.load_content(&initial);
        for request in &requests {
            apply_editor(&mut editor, request);
        }

        let text = editor.get_text();
        let undo_len = editor.history().undo_len();
        prop_assert!(!editor.redo().unwrap());
        prop_assert_eq!(editor.get_text(), text.clone());
        prop_assert_eq!(editor.history().undo_len(), undo_len);

        while editor.undo().unwrap() {}
        let redo_len = editor.history().redo_len();
        let base = editor.get_text();
        prop_assert!(!editor.undo().unwrap());
        prop_assert_eq!(editor.get_text(), base);
        prop_assert_eq!(editor.history().redo_len(), redo_len);
    }

    #[test]
    fn fresh_edit_invalidates_redo(
        requests in proptest::collection::vec(request_strategy(), 1..10),
        fresh in request_strategy()
    ) {
        let mut editor = TextEditor::new();
        editor.load_content("seed text for edits");
        for request in &requests {
            apply_editor(&mut editor, request);
        }
        editor.undo().unwrap();

        if apply_editor(&mut editor, &fresh) {
            let text = editor.get_text();
            prop_assert!(!editor.can_redo());
            prop_assert!(!editor.redo().unwrap());
            prop_assert_eq!(editor.get_text(), text);
        }
    }

    #[test]
    fn replace_undoes_in_a_single_step(
        initial in "[a-z]{1,16}",
        pos in 0usize..16,
        len in 0usize..8,
        text in "[A-Z]{0,8}"
    ) {
        let mut editor = TextEditor::new();
        editor.load_content(&initial);
        if editor.replace_range(pos, len, &text).unwrap() {
            prop_assert_eq!(editor.history().undo_len(), 1);
            prop_assert!(editor.undo().unwrap());
            prop_assert_eq!(editor.get_text(), initial);
        }
    }
}

#[test]
fn insert_and_delete_counts_determine_length() {
    let mut editor = TextEditor::new();
    for (i, ch) in "abcdef".chars().enumerate() {
        editor.insert_text(i, &ch.to_string()).unwrap();
    }
    editor.delete_range(0, 1).unwrap();
    editor.delete_range(2, 1).unwrap();
    assert_eq!(editor.len_chars(), 6 - 2);
    assert_eq!(editor.get_text(), "bcef");
}

#[test]
fn store_boundaries() {
    let mut buffer = seqedit::GapBuffer::new();
    assert_eq!(buffer.delete_at(0), None);
    assert_eq!(buffer.len_chars(), 0);

    assert!(buffer.insert_at(0, 'x'));
    assert!(buffer.insert_at(buffer.len_chars(), 'y'));
    assert!(!buffer.insert_at(buffer.len_chars() + 1, 'z'));
    assert_eq!(buffer.get_text(), "xy");
}
