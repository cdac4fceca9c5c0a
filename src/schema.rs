//! Wide-table schema construction.
//!
//! Turns the per-capture snapshots into a flat table with one row per
//! capture and one column per (GPU, metric) pair. The device set is the union
//! over the whole log, so every row carries every column; a GPU missing from a
//! capture simply has empty cells in that row.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::parsers::types::{Metric, Snapshot};

/// Name of the leading column
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Timestamp format as written by `date '+%F %T'`
const SOURCE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format shown in the report
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// A non-empty table cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(u64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Int(n) => write!(f, "{}", n),
        }
    }
}

/// One row; positions line up with [`Table::columns`], `None` is an empty cell
pub type Row = Vec<Option<Cell>>;

/// Normalized wide table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Find column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` for the named column; `None` for empty cells and unknown columns
    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row)?.get(col)?.as_ref()
    }

    /// Stringified values of one column, header first; empty cells become ""
    pub fn column_strings(&self, col: usize) -> Vec<String> {
        let header = self.columns.get(col).cloned().unwrap_or_default();
        std::iter::once(header)
            .chain(self.rows.iter().map(|row| {
                row.get(col)
                    .and_then(|cell| cell.as_ref())
                    .map(Cell::to_string)
                    .unwrap_or_default()
            }))
            .collect()
    }
}

/// Reformat a capture timestamp for display.
///
/// A timestamp that does not parse is returned unchanged.
pub fn format_timestamp(timestamp: &str) -> String {
    match NaiveDateTime::parse_from_str(timestamp, SOURCE_TIMESTAMP_FORMAT) {
        Ok(dt) => dt.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        Err(e) => {
            tracing::warn!("Keeping timestamp {:?} as-is: {}", timestamp, e);
            timestamp.to_string()
        }
    }
}

/// All GPU indices seen anywhere in the log, ascending
pub fn device_indices(snapshots: &[Snapshot]) -> Vec<u32> {
    snapshots
        .iter()
        .flat_map(|s| s.devices.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Column list: `timestamp`, then the six metrics of each GPU in index order
pub fn columns_for(devices: &[u32]) -> Vec<String> {
    std::iter::once(TIMESTAMP_COLUMN.to_string())
        .chain(
            devices
                .iter()
                .flat_map(|&device| Metric::all().map(move |m| m.column_name(device))),
        )
        .collect()
}

/// Expand snapshots into the wide table, preserving capture order
pub fn build(snapshots: &[Snapshot]) -> Table {
    let devices = device_indices(snapshots);
    let columns = columns_for(&devices);

    let rows: Vec<Row> = snapshots
        .iter()
        .map(|snapshot| {
            let mut row: Row = Vec::with_capacity(columns.len());
            row.push(Some(Cell::Text(format_timestamp(&snapshot.timestamp))));
            for device in &devices {
                let metrics = snapshot.devices.get(device);
                row.extend(
                    Metric::all().map(|m| metrics.and_then(|dm| dm.get(m)).map(Cell::Int)),
                );
            }
            row
        })
        .collect();

    tracing::debug!(
        "Built table with {} GPUs, {} columns, {} rows",
        devices.len(),
        columns.len(),
        rows.len()
    );

    Table { columns, rows }
}
