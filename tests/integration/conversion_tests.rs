//! End-to-end conversion tests
//!
//! Tests cover:
//! - Writing a workbook from the example log
//! - NoDataParsed outcome without an output file
//! - Fatal input and output errors

use std::path::PathBuf;

use crate::common::example_files::*;
use smilog::convert::{convert, ConvertError, ConvertOptions, Outcome};
use smilog::export::{ExportError, SheetLayout, TableSink, XlsxSink};
use smilog::schema::Table;

fn options(input: impl Into<PathBuf>, output: PathBuf) -> ConvertOptions {
    ConvertOptions {
        output,
        ..ConvertOptions::new(input)
    }
}

// ============================================
// Success Tests
// ============================================

#[test]
fn test_convert_example_log() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");

    let outcome = convert(&options(TWO_GPU_BURN, output.clone())).expect("Should convert");

    assert_eq!(
        outcome,
        Outcome::Saved {
            rows: 3,
            path: output.clone()
        }
    );
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"PK"), "Output should be an xlsx zip");
}

#[test]
fn test_convert_custom_sheet_and_width() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("burn.xlsx");
    let opts = ConvertOptions {
        sheet: "burn-in".to_string(),
        max_column_width: 12,
        wrap_text: false,
        ..options(TWO_GPU_BURN, output.clone())
    };

    let outcome = convert(&opts).expect("Should convert");
    assert!(matches!(outcome, Outcome::Saved { rows: 3, .. }));
    assert!(output.exists());
}

#[test]
fn test_sink_reports_path() {
    let sink = XlsxSink::new("out/report.xlsx", "metrics");
    assert_eq!(sink.path(), std::path::Path::new("out/report.xlsx"));
}

// ============================================
// No Data Tests
// ============================================

#[test]
fn test_convert_without_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.log");
    std::fs::write(&input, "+------+\n|   0  NVIDIA A10  Off |\n").unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");

    let outcome = convert(&options(&input, output.clone())).expect("Should not fail");

    assert_eq!(outcome, Outcome::NoDataParsed);
    assert!(!output.exists(), "No output file should be created");
}

#[test]
fn test_convert_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.log");
    std::fs::write(&input, "").unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");

    assert_eq!(
        convert(&options(&input, output.clone())).unwrap(),
        Outcome::NoDataParsed
    );
    assert!(!output.exists());
}

// ============================================
// Error Tests
// ============================================

#[test]
fn test_convert_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("does_not_exist.log");
    let output = dir.path().join("gpu_metrics.xlsx");

    let err = convert(&options(&input, output.clone())).unwrap_err();
    match err {
        ConvertError::InputUnavailable { path, .. } => assert_eq!(path, input),
        other => panic!("Expected InputUnavailable, got {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn test_convert_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("no_such_dir").join("gpu_metrics.xlsx");

    let err = convert(&options(TWO_GPU_BURN, output.clone())).unwrap_err();
    match err {
        ConvertError::OutputWriteFailure { path, source } => {
            assert_eq!(path, output);
            assert!(matches!(source, ExportError::Xlsx(_)));
        }
        other => panic!("Expected OutputWriteFailure, got {:?}", other),
    }
}

#[test]
fn test_sink_rejects_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");
    let table = Table {
        columns: vec!["timestamp".to_string()],
        rows: vec![],
    };
    let layout = SheetLayout::for_table(&table, 60);

    let result = XlsxSink::new(&path, "metrics").write_table(&table, &layout);
    assert!(matches!(result, Err(ExportError::EmptyTable)));
    assert!(!path.exists());
}
