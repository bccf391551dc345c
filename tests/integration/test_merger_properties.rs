//! Property tests of the merge structures.
//!
//! Each merger is driven with random sequences of operations and checked
//! against the ordering and bookkeeping guarantees every merger provides.

use bammerge_lib::merge::{Candidate, MergeOrder, Merger, MultiMerger, PositionKey};
use bammerge_lib::record::AlignmentRecord;
use proptest::prelude::*;

/// Minimal record carrying just the merge fields plus a serial number.
#[derive(Clone, Debug)]
struct Rec {
    rid: i32,
    pos: i32,
    name: Vec<u8>,
    serial: usize,
}

impl AlignmentRecord for Rec {
    fn reference_sequence_id(&self) -> i32 {
        self.rid
    }

    fn position(&self) -> i32 {
        self.pos
    }

    fn name(&self) -> &[u8] {
        &self.name
    }

    fn materialize_name(&mut self) -> bool {
        true
    }
}

type Cand = Candidate<String, Rec>;

fn stream_name(n: u8) -> String {
    format!("in{n}.bam")
}

fn arb_record() -> impl Strategy<Value = (i32, i32, Vec<u8>)> {
    (
        prop_oneof![4 => 0i32..4, 1 => Just(-1)],
        0i32..50,
        proptest::collection::vec(b'a'..=b'd', 1..4),
    )
}

fn arb_candidates(max: usize) -> impl Strategy<Value = Vec<Cand>> {
    proptest::collection::vec((0u8..6, arb_record()), 0..max).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(serial, (stream, (rid, pos, name)))| {
                Candidate::new(stream_name(stream), Rec { rid, pos, name, serial })
            })
            .collect()
    })
}

fn arb_order() -> impl Strategy<Value = MergeOrder> {
    prop_oneof![Just(MergeOrder::ByPosition), Just(MergeOrder::ByName), Just(MergeOrder::Unsorted)]
}

fn filled(order: MergeOrder, candidates: &[Cand]) -> MultiMerger<String, Rec> {
    let mut merger = MultiMerger::new(order);
    for candidate in candidates {
        merger.add(candidate.clone()).expect("add should succeed");
    }
    merger
}

fn drain(merger: &mut MultiMerger<String, Rec>) -> Vec<Cand> {
    std::iter::from_fn(|| merger.take_first()).collect()
}

fn position_key(record: &Rec) -> PositionKey {
    PositionKey::new(record.rid, record.pos)
}

/// True if `a` may precede `b` under `order`.
fn in_order(order: MergeOrder, a: &Rec, b: &Rec) -> bool {
    match order {
        MergeOrder::ByPosition => position_key(a) <= position_key(b),
        MergeOrder::ByName => a.name <= b.name,
        MergeOrder::Unsorted => a.serial < b.serial,
    }
}

proptest! {
    // Every taken candidate is no greater than everything still held.
    #[test]
    fn proptest_take_first_is_minimum(order in arb_order(), candidates in arb_candidates(40)) {
        let mut merger = filled(order, &candidates);
        let drained = drain(&mut merger);
        for pair in drained.windows(2) {
            prop_assert!(in_order(order, &pair[0].record, &pair[1].record));
        }
    }

    // Draining returns exactly the candidates that were added.
    #[test]
    fn proptest_conservation(order in arb_order(), candidates in arb_candidates(40)) {
        let mut merger = filled(order, &candidates);
        let mut serials: Vec<usize> = drain(&mut merger).iter().map(|c| c.record.serial).collect();
        serials.sort_unstable();
        let expected: Vec<usize> = (0..candidates.len()).collect();
        prop_assert_eq!(serials, expected);
        prop_assert!(merger.is_empty());
    }

    // `len` tracks adds and removals, and `is_empty` agrees with it.
    #[test]
    fn proptest_size(
        order in arb_order(),
        candidates in arb_candidates(30),
        takes in 0usize..40,
    ) {
        let mut merger = filled(order, &candidates);
        prop_assert_eq!(merger.len(), candidates.len());

        let mut expected = candidates.len();
        for _ in 0..takes {
            let taken = merger.take_first();
            prop_assert_eq!(taken.is_some(), expected > 0);
            expected = expected.saturating_sub(1);
            prop_assert_eq!(merger.len(), expected);
            prop_assert_eq!(merger.is_empty(), expected == 0);
        }
    }

    // Unmapped records come out after every mapped record.
    #[test]
    fn proptest_unmapped_last(candidates in arb_candidates(40)) {
        let mut merger = filled(MergeOrder::ByPosition, &candidates);
        let drained = drain(&mut merger);
        if let Some(first_unmapped) = drained.iter().position(|c| c.record.rid == -1) {
            prop_assert!(drained[first_unmapped..].iter().all(|c| c.record.rid == -1));
        }
    }

    // Unsorted merging is first-in, first-out.
    #[test]
    fn proptest_unsorted_fifo(candidates in arb_candidates(40)) {
        let mut merger = filled(MergeOrder::Unsorted, &candidates);
        let serials: Vec<usize> = drain(&mut merger).iter().map(|c| c.record.serial).collect();
        let expected: Vec<usize> = (0..candidates.len()).collect();
        prop_assert_eq!(serials, expected);
    }

    // Removing by stream takes out one candidate of that stream and nothing else.
    #[test]
    fn proptest_remove_by_stream(
        order in arb_order(),
        candidates in arb_candidates(30),
        stream in 0u8..6,
    ) {
        let stream = stream_name(stream);
        let mut merger = filled(order, &candidates);
        let before = candidates.iter().filter(|c| c.stream == stream).count();

        let removed = merger.remove_by_stream(&stream);
        prop_assert_eq!(removed.is_some(), before > 0);
        if let Some(removed) = removed {
            prop_assert_eq!(&removed.stream, &stream);
        }

        let after = drain(&mut merger);
        prop_assert_eq!(after.len(), candidates.len() - usize::from(before > 0));
        prop_assert_eq!(
            after.iter().filter(|c| c.stream == stream).count(),
            before.saturating_sub(1)
        );
    }

    // Clearing empties the merger and clearing again changes nothing.
    #[test]
    fn proptest_clear_is_idempotent(order in arb_order(), candidates in arb_candidates(30)) {
        let mut merger = filled(order, &candidates);
        merger.clear();
        prop_assert!(merger.is_empty());
        prop_assert!(merger.first().is_none());
        merger.clear();
        prop_assert_eq!(merger.len(), 0);
        prop_assert!(merger.take_first().is_none());
    }

    // `first` agrees with the following `take_first`.
    #[test]
    fn proptest_first_matches_take_first(order in arb_order(), candidates in arb_candidates(30)) {
        let mut merger = filled(order, &candidates);
        while let Some(serial) = merger.first().map(|c| c.record.serial) {
            let taken = merger.take_first().expect("first was Some");
            prop_assert_eq!(taken.record.serial, serial);
        }
    }
}
