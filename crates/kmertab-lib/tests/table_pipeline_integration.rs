//! Integration tests for the table pipeline
//!
//! These tests run tuple files through the reader, the builder and the
//! writer, and check the shape guarantees of the emitted table.

use kmertab_lib::table::{read_tuple_file, read_tuples};
use kmertab_lib::{
    filter_calls, CountTuple, MatrixTableBuilder, TableConfiguration, TableError, VariantCall,
};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

/// Small deterministic generator for synthetic tuple streams
fn synthetic_tuples(n: usize, seed: u64) -> Vec<CountTuple> {
    let mut state = seed;
    let mut tuples = Vec::with_capacity(n);
    for _ in 0..n {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        let entity = format!("acc{}", (state >> 33) % 17);
        let feature = format!("k{}", (state >> 17) % 29);
        let count = ((state >> 40) % 100) as i64;
        tuples.push(CountTuple::new(entity, feature, count));
    }
    tuples
}

#[test]
fn test_end_to_end_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file, "A\tx\t3").unwrap();
    writeln!(temp_file, "B\ty\t5").unwrap();
    writeln!(temp_file, "A\ty\t2").unwrap();
    temp_file.flush().unwrap();

    let tuples = read_tuple_file(temp_file.path()).unwrap();
    let table = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();

    let mut out = Vec::new();
    table.write_to(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Accessions,x,y\nA,3,2\nB,0,5\n");
}

#[test]
fn test_shape_guarantees() {
    let tuples = synthetic_tuples(2_000, 42);
    let table = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();

    let entities: HashSet<&str> = tuples.iter().map(|t| t.entity.as_str()).collect();
    let features: HashSet<&str> = tuples.iter().map(|t| t.feature.as_str()).collect();

    let lines = table.to_lines();
    assert_eq!(lines.len(), 1 + entities.len());
    for line in &lines {
        assert_eq!(line.split(',').count(), 1 + features.len());
    }
}

#[test]
fn test_cells_hold_last_count_or_zero() {
    let tuples = synthetic_tuples(1_000, 7);
    let table = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();

    let entities: Vec<String> = table.entities().map(str::to_string).collect();
    let features: Vec<String> = table.features().map(str::to_string).collect();
    for entity in &entities {
        for feature in &features {
            let expected = tuples
                .iter()
                .rev()
                .find(|t| &t.entity == entity && &t.feature == feature)
                .map_or(0, |t| t.count as u64);
            assert_eq!(table.count(entity, feature), Some(expected));
        }
    }
}

#[test]
fn test_row_order_is_first_seen() {
    let tuples = synthetic_tuples(500, 3);
    let table = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();

    let mut first_seen: Vec<&str> = Vec::new();
    for tuple in &tuples {
        if !first_seen.contains(&tuple.entity.as_str()) {
            first_seen.push(&tuple.entity);
        }
    }
    let rows: Vec<&str> = table.entities().collect();
    assert_eq!(rows, first_seen);

    let first_fields: Vec<String> = table
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(first_fields, first_seen);
}

#[test]
fn test_deterministic_across_runs() {
    let tuples = synthetic_tuples(1_500, 11);
    let first = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();
    let second = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();
    assert_eq!(first.to_lines(), second.to_lines());
}

#[test]
fn test_column_order_independent_of_arrival() {
    let forward = vec![
        CountTuple::new("A", "x", 1),
        CountTuple::new("A", "y", 2),
        CountTuple::new("A", "z", 3),
    ];
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &forward).unwrap();
    let b = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &reversed).unwrap();
    assert_eq!(a.header(), b.header());
    assert_eq!(a.to_lines(), b.to_lines());
}

#[test]
fn test_parallel_build_matches_sequential() {
    let tuples = synthetic_tuples(10_000, 99);
    let config = TableConfiguration {
        num_threads: 3,
        parallel_chunk_size: 257,
        ..TableConfiguration::default()
    };
    let sequential = MatrixTableBuilder::build_from_tuples(config.clone(), &tuples).unwrap();
    let parallel = MatrixTableBuilder::build_parallel(config, &tuples).unwrap();
    assert_eq!(sequential.to_lines(), parallel.to_lines());
}

#[test]
fn test_empty_input() {
    let tuples = read_tuples(Cursor::new("# nothing here\n\n"), "memory").unwrap();
    assert!(tuples.is_empty());

    let table = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples).unwrap();
    assert_eq!(table.to_lines(), ["Accessions"]);

    let table = MatrixTableBuilder::build_parallel(TableConfiguration::default(), &tuples).unwrap();
    assert_eq!(table.to_lines(), ["Accessions"]);
}

#[test]
fn test_negative_count_from_file_aborts_build() {
    let tuples = read_tuples(Cursor::new("A\tx\t1\nB\tx\t-5\n"), "memory").unwrap();
    let result = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples);
    assert!(matches!(result, Err(TableError::NegativeCount { count: -5, .. })));
}

#[test]
fn test_embedded_delimiter_rejected_by_default() {
    let tuples = vec![CountTuple::new("A", "x,y", 1)];
    let result = MatrixTableBuilder::build_from_tuples(TableConfiguration::default(), &tuples);
    assert!(matches!(result, Err(TableError::ForbiddenCharacter { .. })));
}

#[test]
fn test_call_filter_example() {
    let calls = vec![
        VariantCall::new("NA12877", vec![-1, 0]),
        VariantCall::new("NA12878", vec![1, 1]),
    ];
    let kept = filter_calls(&calls, 1);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].call_set_name, "NA12878");
}
