//! Snapshot accumulation
//!
//! Folds the classified line stream into one [`Snapshot`] per capture. The
//! accumulator is a small state machine:
//!
//! | line            | effect                                                   |
//! |-----------------|----------------------------------------------------------|
//! | `Timestamp`     | flush the open snapshot (if any), open a new one         |
//! | `DeviceHeader`  | remember the index; replaces any unconsumed index        |
//! | `Separator`     | nothing                                                  |
//! | `Candidate`     | if an index is pending, extract metrics for it and clear |
//!
//! Malformed input never aborts the fold; it only leaves fields empty.

use std::collections::BTreeMap;

use crate::parsers::types::{ClassifiedLine, DeviceMetrics, Snapshot};
use crate::parsers::NvidiaSmi;

/// Counters collected while folding a log
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines fed to the accumulator
    pub lines: usize,
    /// Timestamp lines, one per capture
    pub captures: usize,
    pub device_headers: usize,
    /// Candidate lines consumed as a device's metrics row
    pub metrics_lines: usize,
    /// Candidate lines seen with no device header pending
    pub ignored_candidates: usize,
    /// Headers replaced by another header before their metrics row arrived
    pub overwritten_headers: usize,
    /// Overwritten headers whose device had no metrics yet in that capture
    pub dropped_devices: usize,
    /// Metrics rows where no pattern matched
    pub empty_metrics: usize,
}

/// Result of parsing a whole capture log
#[derive(Clone, Debug, Default)]
pub struct ParsedLog {
    pub snapshots: Vec<Snapshot>,
    pub stats: ParseStats,
}

/// Stateful fold over classified lines
#[derive(Debug, Default)]
pub struct SnapshotAccumulator {
    current_timestamp: Option<String>,
    current_devices: BTreeMap<u32, DeviceMetrics>,
    pending_device_index: Option<u32>,
    stats: ParseStats,
}

impl SnapshotAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one line, returning a snapshot when this line completes one
    pub fn feed(&mut self, line: ClassifiedLine) -> Option<Snapshot> {
        self.stats.lines += 1;

        match line {
            ClassifiedLine::Timestamp(timestamp) => {
                self.stats.captures += 1;
                let completed = self.flush();
                self.current_timestamp = Some(timestamp);
                completed
            }
            ClassifiedLine::DeviceHeader(index) => {
                self.stats.device_headers += 1;
                if let Some(previous) = self.pending_device_index.replace(index) {
                    self.stats.overwritten_headers += 1;
                    // Process table rows reuse the header shape for GPUs already recorded
                    if !self.current_devices.contains_key(&previous) {
                        self.stats.dropped_devices += 1;
                    }
                    tracing::debug!(
                        "GPU {} header replaced by GPU {} before its metrics row",
                        previous,
                        index
                    );
                }
                None
            }
            ClassifiedLine::Separator => None,
            ClassifiedLine::Candidate(text) => {
                match self.pending_device_index.take() {
                    Some(index) => {
                        let metrics = NvidiaSmi::extract(&text);
                        self.stats.metrics_lines += 1;
                        if metrics.is_empty() {
                            self.stats.empty_metrics += 1;
                            tracing::debug!("No metrics matched for GPU {}: {}", index, text);
                        }
                        self.current_devices.insert(index, metrics);
                    }
                    None => self.stats.ignored_candidates += 1,
                }
                None
            }
        }
    }

    /// End of input: flush the last snapshot if a timestamp was ever seen
    pub fn finish(&mut self) -> Option<Snapshot> {
        self.flush()
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Hand off the open snapshot and reset per-capture state
    fn flush(&mut self) -> Option<Snapshot> {
        self.pending_device_index = None;
        let devices = std::mem::take(&mut self.current_devices);
        self.current_timestamp
            .take()
            .map(|timestamp| Snapshot { timestamp, devices })
    }
}

/// Fold a sequence of classified lines into snapshots
pub fn accumulate<I>(lines: I) -> ParsedLog
where
    I: IntoIterator<Item = ClassifiedLine>,
{
    let mut accumulator = SnapshotAccumulator::new();
    let mut snapshots: Vec<Snapshot> = lines
        .into_iter()
        .filter_map(|line| accumulator.feed(line))
        .collect();
    snapshots.extend(accumulator.finish());

    ParsedLog {
        snapshots,
        stats: *accumulator.stats(),
    }
}

/// Classify and fold the full text of a capture log
pub fn parse_log(contents: &str) -> ParsedLog {
    if !contents.is_empty() && !NvidiaSmi::detect(contents) {
        tracing::warn!("Input does not look like an nvidia-smi capture log");
    }

    let parsed = accumulate(contents.lines().map(NvidiaSmi::classify));

    let stats = &parsed.stats;
    tracing::info!(
        "Parsed {} captures from {} lines ({} device rows, {} ignored lines)",
        parsed.snapshots.len(),
        stats.lines,
        stats.metrics_lines,
        stats.ignored_candidates
    );
    if stats.dropped_devices > 0 {
        tracing::warn!(
            "{} device header(s) had no metrics row before the next header",
            stats.dropped_devices
        );
    }

    parsed
}
