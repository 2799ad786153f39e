//! Property-based tests for the dialogue mode invariant
//!
//! Whatever order thoughts and replies arrive in:
//! - markers alternate enter/exit, never the same kind twice in a row
//! - the latest marker is an enter marker exactly when the mode is internal
//! - each transition adds exactly one announcement and one marker

use super::*;
use crate::llm::testing::MockLlmService;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Think,
    Speak,
}

fn arb_turns() -> impl Strategy<Value = Vec<Turn>> {
    proptest::collection::vec(prop_oneof![Just(Turn::Think), Just(Turn::Speak)], 0..20)
}

fn run(turns: &[Turn]) -> Dialogue {
    let mock = Arc::new(MockLlmService::new());
    for i in 0..turns.len() {
        mock.queue_text(&format!("reply {i}"));
    }
    let mut dialogue = Dialogue::with_system_prompt(mock, "system", "test-model");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        for (i, turn) in turns.iter().enumerate() {
            let note = format!("note {i}");
            match turn {
                Turn::Think => dialogue.think_internal(&note).await.unwrap(),
                Turn::Speak => dialogue.speak_external(&note).await.unwrap(),
            };
        }
    });
    dialogue
}

fn markers(dialogue: &Dialogue) -> Vec<&str> {
    dialogue
        .messages()
        .iter()
        .filter(|m| m.role == Role::Function)
        .filter_map(|m| m.name.as_deref())
        .collect()
}

proptest! {
    #[test]
    fn prop_markers_alternate(turns in arb_turns()) {
        let dialogue = run(&turns);
        let markers = markers(&dialogue);

        for pair in markers.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }
        if let Some(first) = markers.first() {
            prop_assert_eq!(*first, ENTER_MONOLOGUE);
        }
    }

    #[test]
    fn prop_mode_matches_latest_marker(turns in arb_turns()) {
        let dialogue = run(&turns);
        let internal = markers(&dialogue).last() == Some(&ENTER_MONOLOGUE);
        prop_assert_eq!(dialogue.mode() == Mode::Internal, internal);

        let expected = match turns.last() {
            Some(Turn::Think) => Mode::Internal,
            Some(Turn::Speak) | None => Mode::External,
        };
        prop_assert_eq!(dialogue.mode(), expected);
    }

    #[test]
    fn prop_message_count_tracks_transitions(turns in arb_turns()) {
        let dialogue = run(&turns);

        let mut mode = Mode::External;
        let mut transitions = 0;
        for turn in &turns {
            let next = match turn {
                Turn::Think => Mode::Internal,
                Turn::Speak => Mode::External,
            };
            if next != mode {
                transitions += 1;
                mode = next;
            }
        }

        // system prompt + note and reply per turn + announcement and marker per transition
        let expected = 1 + 2 * turns.len() + 2 * transitions;
        prop_assert_eq!(dialogue.messages().len(), expected);
        prop_assert_eq!(markers(&dialogue).len(), transitions);
    }
}
