//! Custom assertion helpers for integration tests.

#![allow(dead_code)]

use noodles::sam::Header;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::header::record::value::map::header::tag as header_tag;

/// Coordinate key of a record: mapped records by (reference, start), unmapped last.
fn coordinate_key(record: &RecordBuf) -> (bool, usize, usize) {
    match (record.reference_sequence_id(), record.alignment_start()) {
        (Some(id), Some(start)) if !record.flags().is_unmapped() => (false, id, usize::from(start)),
        _ => (true, 0, 0),
    }
}

/// Asserts that records are in coordinate order with unmapped records last.
///
/// # Panics
///
/// Panics at the first pair of records out of order.
pub fn assert_coordinate_sorted(records: &[RecordBuf]) {
    for (i, pair) in records.windows(2).enumerate() {
        let (prev, next) = (coordinate_key(&pair[0]), coordinate_key(&pair[1]));
        if prev.0 && next.0 {
            continue;
        }
        assert!(prev <= next, "records {i} and {} out of coordinate order: {prev:?} > {next:?}", i + 1);
    }
}

/// Asserts that read names are in byte-wise order.
///
/// # Panics
///
/// Panics at the first pair of records out of order.
pub fn assert_queryname_sorted(records: &[RecordBuf]) {
    for (i, pair) in records.windows(2).enumerate() {
        let prev = pair[0].name().map(|n| n.to_vec()).unwrap_or_default();
        let next = pair[1].name().map(|n| n.to_vec()).unwrap_or_default();
        assert!(prev <= next, "records {i} and {} out of queryname order", i + 1);
    }
}

/// Asserts the value of the `@HD SO` tag.
///
/// # Panics
///
/// Panics if the tag is missing or differs.
pub fn assert_sort_order(header: &Header, expected: &str) {
    let so = header
        .header()
        .and_then(|hd| hd.other_fields().get(&header_tag::SORT_ORDER))
        .expect("header should have an SO tag");
    assert_eq!(so.as_slice(), expected.as_bytes());
}
