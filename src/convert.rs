//! End-to-end conversion: capture log in, spreadsheet out.
//!
//! Per-line and per-field problems never surface here; they are absorbed as
//! empty cells by the parser. Only file-level I/O failures are errors, and an
//! input with no captures is a normal [`Outcome::NoDataParsed`].

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::export::{ExportError, SheetLayout, TableSink, XlsxSink, DEFAULT_MAX_COLUMN_WIDTH};
use crate::schema::{self, Table};
use crate::snapshot::{self, ParseStats};

/// Default output file name
pub const DEFAULT_OUTPUT: &str = "gpu_metrics.xlsx";

/// Default sheet name
pub const DEFAULT_SHEET: &str = "metrics";

/// Fatal conversion errors
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Failed to read input {path:?}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write output {path:?}")]
    OutputWriteFailure {
        path: PathBuf,
        #[source]
        source: ExportError,
    },
}

/// What a successful run produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Table written to `path`
    Saved { rows: usize, path: PathBuf },
    /// No capture timestamps found; nothing was written
    NoDataParsed,
}

/// Inputs for one conversion
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheet: String,
    pub max_column_width: usize,
    pub wrap_text: bool,
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            sheet: DEFAULT_SHEET.to_string(),
            max_column_width: DEFAULT_MAX_COLUMN_WIDTH,
            wrap_text: true,
        }
    }
}

/// Decode raw bytes, dropping any invalid UTF-8 sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0usize;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    if dropped > 0 {
        tracing::debug!("Dropped {} invalid UTF-8 bytes from input", dropped);
    }
    text
}

/// Read a capture log from disk
pub fn read_log(path: &Path) -> Result<String, ConvertError> {
    let bytes = std::fs::read(path).map_err(|source| ConvertError::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("Read {} bytes from {:?}", bytes.len(), path);
    Ok(decode_lossy(&bytes))
}

/// Parse log text into the wide table
pub fn log_to_table(contents: &str) -> (Table, ParseStats) {
    let parsed = snapshot::parse_log(contents);
    (schema::build(&parsed.snapshots), parsed.stats)
}

/// Run the whole pipeline for `options`
pub fn convert(options: &ConvertOptions) -> Result<Outcome, ConvertError> {
    let contents = read_log(&options.input)?;
    let (table, _stats) = log_to_table(&contents);

    if table.is_empty() {
        tracing::info!("No capture timestamps found in {:?}", options.input);
        return Ok(Outcome::NoDataParsed);
    }

    let layout = SheetLayout::for_table(&table, options.max_column_width)
        .with_wrap_text(options.wrap_text);
    let mut sink = XlsxSink::new(&options.output, &options.sheet);
    sink.write_table(&table, &layout)
        .map_err(|source| ConvertError::OutputWriteFailure {
            path: options.output.clone(),
            source,
        })?;

    Ok(Outcome::Saved {
        rows: table.rows.len(),
        path: options.output.clone(),
    })
}
