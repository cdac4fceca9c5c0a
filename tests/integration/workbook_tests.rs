//! Saved workbook contents
//!
//! Tests cover:
//! - Header row and data rows mapped cell by cell from the table
//! - Blank cells for missing values, wrap format on every cell
//! - Column widths and sheet name carried into the file
//! - Integers beyond f64 precision written as text

use std::path::PathBuf;

use crate::common::example_files::*;
use crate::common::read_example_file;
use crate::common::workbook::*;
use smilog::convert::{convert, log_to_table, ConvertOptions};
use smilog::export::{export, SheetLayout};
use smilog::schema::{Cell, Table};

fn convert_example(output: PathBuf) -> ConvertOptions {
    ConvertOptions {
        output,
        ..ConvertOptions::new(TWO_GPU_BURN)
    }
}

fn expected_value(cell: &Option<Cell>) -> XlsxValue {
    match cell {
        Some(Cell::Text(s)) => XlsxValue::Text(s.clone()),
        Some(Cell::Int(n)) => XlsxValue::Number(*n as f64),
        None => XlsxValue::Blank,
    }
}

// ============================================
// Layout Tests
// ============================================

#[test]
fn test_saved_sheet_matches_table() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");
    convert(&convert_example(output.clone())).expect("Should convert");

    let (table, _) = log_to_table(&read_example_file(TWO_GPU_BURN));
    let sheet = read_sheet(&output);

    assert_eq!(sheet.name, "metrics");
    assert_eq!(sheet.dimension, "A1:M4");

    for (col, name) in table.columns.iter().enumerate() {
        assert_eq!(
            sheet.cell(0, col as u32).value,
            XlsxValue::Text(name.clone()),
            "Header of column {}",
            col
        );
    }

    // Data starts on the second sheet row
    for (i, row) in table.rows.iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            assert_eq!(
                sheet.cell(i as u32 + 1, col as u32).value,
                expected_value(cell),
                "Row {} column {}",
                i,
                table.columns[col]
            );
        }
    }
}

#[test]
fn test_saved_sheet_first_row_values() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");
    convert(&convert_example(output.clone())).expect("Should convert");

    let sheet = read_sheet(&output);
    assert_eq!(
        sheet.cell(1, 0).value,
        XlsxValue::Text("06-03-2025 21:37:00".to_string())
    );
    // gpu1 reported ERR! in the last capture; only memory survived
    let (table, _) = log_to_table(&read_example_file(TWO_GPU_BURN));
    let temp = table.column_index("gpu1_temp_c").unwrap() as u32;
    let used = table.column_index("gpu1_memory_used_mib").unwrap() as u32;
    assert_eq!(sheet.cell(3, temp).value, XlsxValue::Blank);
    assert_eq!(sheet.cell(3, used).value, XlsxValue::Number(20480.0));
}

#[test]
fn test_saved_sheet_wraps_every_cell() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");
    convert(&convert_example(output.clone())).expect("Should convert");

    let sheet = read_sheet(&output);
    // 13 columns x (header + 3 captures), blanks included
    assert_eq!(sheet.cells.len(), 13 * 4);
    for ((row, col), cell) in &sheet.cells {
        assert!(sheet.wraps(cell), "Cell at row {} column {} should wrap", row, col);
    }
}

#[test]
fn test_saved_sheet_column_widths() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("gpu_metrics.xlsx");
    convert(&convert_example(output.clone())).expect("Should convert");

    let (table, _) = log_to_table(&read_example_file(TWO_GPU_BURN));
    let layout = SheetLayout::for_table(&table, 60);
    let sheet = read_sheet(&output);

    assert_eq!(layout.widths[0], 21.0);
    for (col, width) in layout.widths.iter().enumerate() {
        assert_width(&sheet, col as u32, *width);
    }
}

#[test]
fn test_saved_sheet_custom_name_width_cap_no_wrap() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("burn.xlsx");
    let opts = ConvertOptions {
        sheet: "burn-in".to_string(),
        max_column_width: 12,
        wrap_text: false,
        ..convert_example(output.clone())
    };
    convert(&opts).expect("Should convert");

    let sheet = read_sheet(&output);
    assert_eq!(sheet.name, "burn-in");
    assert_width(&sheet, 0, 12.0);
    for (col, width) in &sheet.widths {
        assert!(*width < 13.0, "Column {} width {} exceeds cap", col, width);
    }
    assert!(sheet.cells.values().all(|cell| !sheet.wraps(cell)));
}

// ============================================
// Number Precision Tests
// ============================================

#[test]
fn test_integers_beyond_f64_precision_written_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.xlsx");
    let table = Table {
        columns: vec!["timestamp".into(), "exact".into(), "huge".into()],
        rows: vec![vec![
            Some(Cell::Text("01-05-2024 12:00:00".into())),
            Some(Cell::Int(1 << 53)),
            Some(Cell::Int(u64::MAX)),
        ]],
    };

    export(&table, &path, "metrics").expect("Should export");

    let sheet = read_sheet(&path);
    assert_eq!(sheet.cell(1, 1).value, XlsxValue::Number(9_007_199_254_740_992.0));
    assert_eq!(
        sheet.cell(1, 2).value,
        XlsxValue::Text("18446744073709551615".to_string())
    );
}
