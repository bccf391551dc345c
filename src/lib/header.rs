//! Building the SAM header of a merged file.
//!
//! The inputs of a merge must share one reference sequence dictionary. The
//! merged header starts from the first input's header, takes the union of the
//! `@RG` and `@PG` records of all inputs, keeps every comment, records the
//! merge order in `@HD SO`, and finally gains a `@PG` record for this program
//! chained to the last program already present.

use anyhow::Result;
use bstr::BString;
use log::warn;
use noodles::sam::Header;
use noodles::sam::header::record::value::Map;
use noodles::sam::header::record::value::map::Program;
use noodles::sam::header::record::value::map::header::tag as header_tag;
use noodles::sam::header::record::value::map::program::tag;
use std::collections::HashSet;

use crate::errors::MergeError;
use crate::merge::MergeOrder;

/// Program name recorded in `@PG`.
pub const PROGRAM_NAME: &str = "bammerge";

/// Merge the headers of several inputs into the header of the merged output.
///
/// `inputs` pairs each header with the path it was read from, in input order.
/// Records keyed by ID keep their first occurrence, and each distinct comment
/// is kept once.
///
/// # Errors
///
/// Returns [`MergeError::IncompatibleReferences`] if any input's reference
/// sequences differ from the first input's in name, length or order.
pub fn merge_headers(
    inputs: &[(String, Header)],
    order: MergeOrder,
) -> crate::errors::Result<Header> {
    let Some((_, first)) = inputs.first() else {
        return Ok(Header::builder().set_header(sorted_header_record(None, order)).build());
    };

    for (path, header) in &inputs[1..] {
        check_reference_sequences(first, path, header)?;
    }

    let mut builder =
        Header::builder().set_header(sorted_header_record(first.header(), order));

    for (name, seq) in first.reference_sequences() {
        builder = builder.add_reference_sequence(name.as_slice(), seq.clone());
    }

    let mut seen_read_groups: HashSet<&[u8]> = HashSet::new();
    let mut seen_programs: HashSet<&[u8]> = HashSet::new();
    let mut seen_comments: HashSet<&[u8]> = HashSet::new();
    for (_, header) in inputs {
        for (id, rg) in header.read_groups() {
            if seen_read_groups.insert(id.as_slice()) {
                builder = builder.add_read_group(id.as_slice(), rg.clone());
            }
        }

        for (id, pg) in header.programs().as_ref() {
            if seen_programs.insert(id.as_slice()) {
                builder = builder.add_program(id.as_slice(), pg.clone());
            }
        }

        for comment in header.comments() {
            if seen_comments.insert(comment.as_slice()) {
                builder = builder.add_comment(comment.clone());
            }
        }
    }

    Ok(builder.build())
}

/// Pick the merge order from the `@HD SO` tags of the inputs.
///
/// All inputs must agree; otherwise the merge falls back to
/// [`MergeOrder::Unsorted`].
#[must_use]
pub fn infer_merge_order(inputs: &[(String, Header)]) -> MergeOrder {
    let mut orders = inputs.iter().map(|(path, header)| (path, MergeOrder::from_header(header)));

    let Some((first_path, first_order)) = orders.next() else {
        return MergeOrder::Unsorted;
    };

    for (path, order) in orders {
        if order != first_order {
            warn!(
                "Inputs disagree on sort order ({first_path}: {first_order}, {path}: {order}); \
                 merging as unsorted"
            );
            return MergeOrder::Unsorted;
        }
    }

    first_order
}

/// Copy of `existing` (or a fresh `@HD`) with `SO` set for `order`.
fn sorted_header_record(
    existing: Option<&Map<noodles::sam::header::record::value::map::Header>>,
    order: MergeOrder,
) -> Map<noodles::sam::header::record::value::map::Header> {
    let mut hd = existing.cloned().unwrap_or_default();
    hd.other_fields_mut().insert(header_tag::SORT_ORDER, BString::from(order.header_so_tag()));
    hd
}

fn check_reference_sequences(
    expected: &Header,
    path: &str,
    actual: &Header,
) -> crate::errors::Result<()> {
    let incompatible = |reason: String| MergeError::IncompatibleReferences {
        path: path.to_string(),
        reason,
    };

    let expected_refs = expected.reference_sequences();
    let actual_refs = actual.reference_sequences();
    if expected_refs.len() != actual_refs.len() {
        return Err(incompatible(format!(
            "expected {} reference sequences, found {}",
            expected_refs.len(),
            actual_refs.len()
        )));
    }

    for (i, ((expected_name, expected_seq), (actual_name, actual_seq))) in
        expected_refs.iter().zip(actual_refs.iter()).enumerate()
    {
        if expected_name != actual_name {
            return Err(incompatible(format!(
                "reference sequence {i} is named '{actual_name}', expected '{expected_name}'"
            )));
        }
        if expected_seq.length() != actual_seq.length() {
            return Err(incompatible(format!(
                "reference sequence '{actual_name}' has length {}, expected {}",
                actual_seq.length(),
                expected_seq.length()
            )));
        }
    }

    Ok(())
}

/// Get the ID of the last program in the @PG chain (for PP chaining).
///
/// Finds the first program that no other program names in its PP tag.
#[must_use]
pub fn get_last_program_id(header: &Header) -> Option<String> {
    let programs = header.programs();
    let program_map = programs.as_ref();

    if program_map.is_empty() {
        return None;
    }

    let mut referenced: HashSet<&[u8]> = HashSet::new();
    for (_id, pg) in program_map {
        if let Some(pp) = pg.other_fields().get(&tag::PREVIOUS_PROGRAM_ID) {
            referenced.insert(pp.as_ref());
        }
    }

    for (id, _pg) in program_map {
        if !referenced.contains(id.as_slice()) {
            return Some(String::from_utf8_lossy(id).to_string());
        }
    }

    // Cyclic PP chain
    program_map.keys().next().map(|id| String::from_utf8_lossy(id).to_string())
}

/// Create a unique program ID by appending .1, .2, etc. if needed.
#[must_use]
pub fn make_unique_program_id(header: &Header, base_id: &str) -> String {
    let programs = header.programs();
    let program_map = programs.as_ref();

    if !program_map.contains_key(base_id.as_bytes()) {
        return base_id.to_string();
    }

    (1..)
        .map(|i| format!("{base_id}.{i}"))
        .find(|candidate| !program_map.contains_key(candidate.as_bytes()))
        .unwrap_or_else(|| base_id.to_string())
}

/// Add a @PG record for this program, chained to the last existing program.
///
/// # Errors
///
/// Returns an error if the program record cannot be built or added.
pub fn add_pg_record(mut header: Header, version: &str, command_line: &str) -> Result<Header> {
    let previous_program = get_last_program_id(&header);
    let unique_id = make_unique_program_id(&header, PROGRAM_NAME);

    let mut builder = Map::<Program>::builder()
        .insert(tag::NAME, PROGRAM_NAME)
        .insert(tag::VERSION, version)
        .insert(tag::COMMAND_LINE, command_line);
    if let Some(pp) = previous_program.as_deref() {
        builder = builder.insert(tag::PREVIOUS_PROGRAM_ID, pp);
    }

    header.programs_mut().add(BString::from(unique_id), builder.build()?)?;
    Ok(header)
}
