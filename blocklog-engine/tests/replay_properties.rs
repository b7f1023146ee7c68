//! Property-based tests for replay.
//!
//! - Determinism: materializing the same index twice yields identical output
//! - Undo/redo: stepping back lands on exactly the earlier materialization
//! - Multi-move keeps the original relative order of the selection, also when
//!   the anchor is itself selected
//! - Soft delete only hides the deleted blocks

mod common;

use blocklog_engine::{Mutation, Transformer};
use blocklog_model::Bundle;
use blocklog_types::EntityUuid;
use common::{content_of, Doc};
use proptest::prelude::*;

const POOL: usize = 6;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

#[derive(Debug, Clone)]
enum Op {
    Add(Option<usize>),
    Move(Vec<usize>, Option<usize>),
    Delete(usize),
    Duplicate(Vec<usize>),
    SetOption(usize, String),
    Merge(usize, usize),
    Split(usize),
    Convert(usize),
}

fn index_strategy() -> impl Strategy<Value = usize> {
    0..POOL
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::option::of(index_strategy()).prop_map(Op::Add),
        (
            prop::collection::vec(index_strategy(), 1..4),
            prop::option::of(index_strategy())
        )
            .prop_map(|(uuids, after)| Op::Move(uuids, after)),
        index_strategy().prop_map(Op::Delete),
        prop::collection::vec(index_strategy(), 1..3).prop_map(Op::Duplicate),
        (index_strategy(), "[a-z]{1,6}").prop_map(|(i, v)| Op::SetOption(i, v)),
        (index_strategy(), index_strategy()).prop_map(|(a, b)| Op::Merge(a, b)),
        index_strategy().prop_map(Op::Split),
        index_strategy().prop_map(Op::Convert),
    ]
}

fn to_mutation(op: &Op, doc: &Doc, pool: &[EntityUuid]) -> Mutation {
    let pick = |i: &usize| pool[*i];
    match op {
        Op::Add(after) => Mutation::add(Bundle::Text, doc.host(), after.as_ref().map(pick)),
        Op::Move(uuids, after) => Mutation::move_to(
            uuids.iter().map(pick).collect(),
            doc.host(),
            after.as_ref().map(pick),
        ),
        Op::Delete(i) => Mutation::delete(vec![pick(i)]),
        Op::Duplicate(uuids) => Mutation::duplicate(uuids.iter().map(pick).collect()),
        Op::SetOption(i, value) => Mutation::set_option(pick(i), "align", value.clone()),
        Op::Merge(a, b) => Mutation::transform(vec![pick(a), pick(b)], Transformer::MergeText),
        Op::Split(i) => Mutation::transform(vec![pick(i)], Transformer::SplitParagraphs),
        Op::Convert(i) => Mutation::convert(vec![pick(i)], Bundle::Title),
    }
}

fn pool_doc() -> (Doc, Vec<EntityUuid>) {
    Doc::with_texts(&["a", "b\n\nc", "d", "e\n\nf\n\ng", "h", "i"])
}

// =============================================================================
// REPLAY PROPERTIES
// =============================================================================

proptest! {
    /// Materializing the same index twice gives identical output.
    #[test]
    fn replay_is_deterministic(ops in prop::collection::vec(op_strategy(), 0..12)) {
        let (doc, pool) = pool_doc();
        let mut state = doc.edit_state();
        for op in &ops {
            state.commit(to_mutation(op, &doc, &pool));
        }

        let first = doc.materialize(&mut state);
        let second = doc.materialize(&mut state);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    /// `materialize(i + 1)`, undo, materialize equals `materialize(i)`.
    #[test]
    fn undo_is_inverse_of_commit(ops in prop::collection::vec(op_strategy(), 1..10)) {
        let (doc, pool) = pool_doc();
        let mut state = doc.edit_state();
        for op in &ops {
            state.commit(to_mutation(op, &doc, &pool));
        }

        for i in -1..(ops.len() as isize - 1) {
            let expected = doc.materialize_at(&mut state, i);
            state.set_index(i + 1);
            doc.materialize(&mut state);
            state.undo();
            prop_assert_eq!(state.current_index(), i);
            prop_assert_eq!(doc.materialize(&mut state), expected);
            state.redo();
        }
    }

    /// The moved set lands contiguously after the anchor, in original order.
    #[test]
    fn multi_move_keeps_relative_order(
        selected in prop::sample::subsequence((0..POOL).collect::<Vec<_>>(), 1..POOL),
        shuffle in any::<prop::sample::Index>(),
        anchor in prop::option::of(index_strategy()),
    ) {
        let (doc, pool) = pool_doc();
        let anchor = anchor.filter(|a| !selected.contains(a)).map(|a| pool[a]);

        let mut picked: Vec<EntityUuid> = selected.iter().map(|i| pool[*i]).collect();
        let rotate = shuffle.index(picked.len());
        picked.rotate_left(rotate);
        picked.reverse();

        let mut state = doc.edit_state();
        state.commit(Mutation::move_to(picked, doc.host(), anchor));
        let content = doc.content(&mut state);

        let expected: Vec<EntityUuid> = selected.iter().map(|i| pool[*i]).collect();
        let start = match anchor {
            Some(a) => content.iter().position(|u| *u == a).unwrap() + 1,
            None => 0,
        };
        prop_assert_eq!(&content[start..start + expected.len()], &expected[..]);
        prop_assert_eq!(content.len(), POOL);
    }

    /// With the anchor inside the selection the landing position shifts, but
    /// the selection still ends up contiguous and in original order.
    #[test]
    fn overlapping_move_stays_contiguous(
        selected in prop::sample::subsequence((0..POOL).collect::<Vec<_>>(), 2..POOL),
        anchor in any::<prop::sample::Index>(),
    ) {
        let (doc, pool) = pool_doc();
        let anchor = pool[selected[anchor.index(selected.len())]];
        let picked: Vec<EntityUuid> = selected.iter().rev().map(|i| pool[*i]).collect();

        let mut state = doc.edit_state();
        state.commit(Mutation::move_to(picked, doc.host(), Some(anchor)));
        let content = doc.content(&mut state);

        let expected: Vec<EntityUuid> = selected.iter().map(|i| pool[*i]).collect();
        let start = content.iter().position(|u| *u == expected[0]).unwrap();
        prop_assert_eq!(&content[start..start + expected.len()], &expected[..]);
        prop_assert_eq!(content.len(), POOL);
    }

    /// Deleting a subset hides exactly that subset, in order.
    #[test]
    fn soft_delete_hides_only_deleted(
        deleted in prop::sample::subsequence((0..POOL).collect::<Vec<_>>(), 0..=POOL),
    ) {
        let (doc, pool) = pool_doc();
        let mut state = doc.edit_state();
        state.commit(Mutation::delete(deleted.iter().map(|i| pool[*i]).collect()));

        let after = content_of(&doc.materialize(&mut state), doc.uuid());
        let before = content_of(&doc.materialize_at(&mut state, -1), doc.uuid());

        let expected: Vec<EntityUuid> = (0..POOL)
            .filter(|i| !deleted.contains(i))
            .map(|i| pool[i])
            .collect();
        prop_assert_eq!(after, expected);
        prop_assert_eq!(before, pool);
    }
}
