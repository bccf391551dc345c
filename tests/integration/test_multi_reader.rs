//! Library-level tests of merging BAM files through `MultiReader`.

use bammerge_lib::bam_io::{BamSource, create_raw_bam_writer};
use bammerge_lib::errors::MergeError;
use bammerge_lib::header::merge_headers;
use bammerge_lib::merge::MergeOrder;
use bammerge_lib::multi_reader::MultiReader;
use bammerge_lib::record::AlignmentRecord;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::helpers::assertions::assert_coordinate_sorted;
use crate::helpers::bam_generator::{
    create_standard_header, mapped_record, names, read_bam, unmapped_record, write_bam,
};

fn write_inputs(dir: &TempDir) -> Vec<PathBuf> {
    let header = create_standard_header(Some("coordinate"));
    let inputs = vec![
        vec![mapped_record("a1", 0, 10), mapped_record("a2", 0, 30), unmapped_record("a3")],
        vec![mapped_record("b1", 0, 20), mapped_record("b2", 1, 1)],
        vec![mapped_record("c1", 0, 5), mapped_record("c2", 0, 40), mapped_record("c3", 1, 2)],
    ];

    inputs
        .iter()
        .enumerate()
        .map(|(i, records)| {
            let path = dir.path().join(format!("in{i}.bam"));
            write_bam(&path, &header, records);
            path
        })
        .collect()
}

fn open_all(paths: &[PathBuf]) -> Vec<BamSource> {
    paths.iter().map(|p| BamSource::open(p).expect("Failed to open BAM")).collect()
}

#[test]
fn test_merge_three_files_by_position() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let paths = write_inputs(&temp_dir);

    let reader = MultiReader::new(open_all(&paths), MergeOrder::ByPosition).unwrap();
    let merged: Vec<(i32, i32)> = reader
        .map(|r| r.unwrap())
        .map(|(_, record)| (record.reference_sequence_id(), record.position()))
        .collect();

    assert_eq!(merged, vec![(0, 4), (0, 9), (0, 19), (0, 29), (0, 39), (1, 0), (1, 1), (-1, -1)]);
}

#[test]
fn test_merge_writes_readable_bam() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let paths = write_inputs(&temp_dir);
    let output = temp_dir.path().join("merged.bam");

    let sources = open_all(&paths);
    let headers: Vec<_> =
        sources.iter().map(|s| (s.path().to_string(), s.header().clone())).collect();
    let header = merge_headers(&headers, MergeOrder::ByPosition).unwrap();

    let mut writer = create_raw_bam_writer(&output, &header, 1).unwrap();
    let mut reader = MultiReader::new(sources, MergeOrder::ByPosition).unwrap();
    while let Some((_, record)) = reader.next_record().unwrap() {
        writer.write_raw_record(record.as_ref()).unwrap();
    }
    writer.finish().unwrap();

    assert_eq!(reader.stats().records_merged, 8);
    assert_eq!(reader.stats().records_per_source, vec![3, 2, 3]);

    let (_, records) = read_bam(&output);
    assert_coordinate_sorted(&records);
    assert_eq!(names(&records), vec!["c1", "a1", "b1", "a2", "c2", "b2", "c3", "a3"]);
}

#[test]
fn test_close_source_mid_merge() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let paths = write_inputs(&temp_dir);
    let closed = paths[2].to_string_lossy().to_string();

    let mut reader = MultiReader::new(open_all(&paths), MergeOrder::ByPosition).unwrap();
    let (id, _) = reader.next_record().unwrap().unwrap();
    assert_eq!(id.to_string(), closed);

    assert!(reader.close_source(closed.as_bytes()));
    assert_eq!(reader.open_sources(), 2);

    let mut rest = Vec::new();
    while let Some((id, _)) = reader.next_record().unwrap() {
        rest.push(id.index());
    }
    assert!(!rest.contains(&2));
    assert_eq!(rest.len(), 5);
}

#[test]
fn test_same_file_twice_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let paths = write_inputs(&temp_dir);
    let sources = open_all(&[paths[0].clone(), paths[0].clone()]);

    let result = MultiReader::new(sources, MergeOrder::ByPosition);
    assert!(matches!(result, Err(MergeError::DuplicateStream { .. })));
}

#[test]
fn test_merge_by_name_materializes_names() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let header = create_standard_header(Some("queryname"));
    let a = temp_dir.path().join("a.bam");
    let b = temp_dir.path().join("b.bam");
    write_bam(&a, &header, &[unmapped_record("q1"), unmapped_record("q3")]);
    write_bam(&b, &header, &[unmapped_record("q2")]);

    let reader = MultiReader::new(open_all(&[a, b]), MergeOrder::ByName).unwrap();
    let merged: Vec<Vec<u8>> = reader.map(|r| r.unwrap().1.name().to_vec()).collect();
    assert_eq!(merged, vec![b"q1".to_vec(), b"q2".to_vec(), b"q3".to_vec()]);
}
