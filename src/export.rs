//! Spreadsheet export for the wide metrics table.
//!
//! The exporter only needs the finished [`Table`] plus a [`SheetLayout`]
//! describing column widths and wrapping. [`TableSink`] is the seam; the
//! `.xlsx` writer is the only implementation.

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::schema::{Cell, Table};

/// Extra characters added to the widest value of a column
const COLUMN_PADDING: usize = 2;

/// Default upper bound for a column width, in characters
pub const DEFAULT_MAX_COLUMN_WIDTH: usize = 60;

/// Excel sheet limits
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Largest integer an Excel number cell (an f64) holds exactly
const MAX_EXACT_NUMBER: u64 = 1 << 53;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while writing a table
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to write; callers check for this before exporting
    #[error("Table has no rows")]
    EmptyTable,

    /// Table exceeds the sheet's row or column limits
    #[error("Table too large for one sheet: {rows} rows x {columns} columns")]
    TooLarge { rows: usize, columns: usize },

    /// Workbook could not be built or saved
    #[error(transparent)]
    Xlsx(#[from] XlsxError),
}

// ============================================================================
// Layout
// ============================================================================

/// Per-column display hints for the sink
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    /// Width of each column, in characters
    pub widths: Vec<f64>,
    /// Wrap text in every cell so row heights adapt
    pub wrap_text: bool,
}

impl SheetLayout {
    /// Compute widths from the table contents
    pub fn for_table(table: &Table, max_width: usize) -> Self {
        Self {
            widths: column_widths(table, max_width)
                .into_iter()
                .map(|w| w as f64)
                .collect(),
            wrap_text: true,
        }
    }

    pub fn with_wrap_text(mut self, wrap_text: bool) -> Self {
        self.wrap_text = wrap_text;
        self
    }
}

/// Width of each column: longest value (header included) plus padding, capped
pub fn column_widths(table: &Table, max_width: usize) -> Vec<usize> {
    (0..table.columns.len())
        .map(|col| {
            let longest = table
                .column_strings(col)
                .iter()
                .map(|s| s.chars().count())
                .max()
                .unwrap_or(0);
            (longest + COLUMN_PADDING).min(max_width)
        })
        .collect()
}

// ============================================================================
// Sinks
// ============================================================================

/// Destination for a finished table
pub trait TableSink {
    fn write_table(&mut self, table: &Table, layout: &SheetLayout) -> Result<(), ExportError>;
}

/// Single-sheet `.xlsx` writer
pub struct XlsxSink {
    path: PathBuf,
    sheet_name: String,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_cells(
        worksheet: &mut Worksheet,
        table: &Table,
        format: &Format,
    ) -> Result<(), XlsxError> {
        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name.as_str(), format)?;
        }

        for (i, row) in table.rows.iter().enumerate() {
            let row_num = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    Some(Cell::Text(s)) => {
                        worksheet.write_string_with_format(row_num, col, s.as_str(), format)?;
                    }
                    Some(Cell::Int(n)) if *n <= MAX_EXACT_NUMBER => {
                        worksheet.write_number_with_format(row_num, col, *n as f64, format)?;
                    }
                    Some(Cell::Int(n)) => {
                        tracing::debug!("Writing {} as text at row {}, column {}", n, row_num, col);
                        worksheet.write_string_with_format(row_num, col, n.to_string(), format)?;
                    }
                    None => {
                        worksheet.write_blank(row_num, col, format)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl TableSink for XlsxSink {
    fn write_table(&mut self, table: &Table, layout: &SheetLayout) -> Result<(), ExportError> {
        if table.is_empty() {
            return Err(ExportError::EmptyTable);
        }
        // Header row takes one of the sheet rows
        if table.rows.len() >= MAX_ROWS || table.columns.len() > MAX_COLUMNS {
            return Err(ExportError::TooLarge {
                rows: table.rows.len(),
                columns: table.columns.len(),
            });
        }

        let mut format = Format::new();
        if layout.wrap_text {
            format = format.set_text_wrap();
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        Self::write_cells(worksheet, table, &format)?;

        for (col, width) in layout.widths.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        workbook.save(&self.path)?;

        tracing::info!(
            "Wrote {} rows x {} columns to {:?} (sheet {:?})",
            table.rows.len(),
            table.columns.len(),
            self.path,
            self.sheet_name
        );
        Ok(())
    }
}

/// Write `table` to a single-sheet workbook at `destination` with default layout
pub fn export(table: &Table, destination: &Path, sheet_name: &str) -> Result<(), ExportError> {
    let layout = SheetLayout::for_table(table, DEFAULT_MAX_COLUMN_WIDTH);
    XlsxSink::new(destination, sheet_name).write_table(table, &layout)
}
