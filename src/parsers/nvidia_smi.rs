//! nvidia-smi table capture parser
//!
//! A capture log is produced by a loop along the lines of
//! `while true; do date '+%F %T'; nvidia-smi; sleep N; done`, so it contains
//! one timestamp line followed by one full device table per capture:
//!
//! ```text
//! 2024-05-01 12:00:00
//! +-----------------------------------------------------------------------------+
//! | NVIDIA-SMI 535.104.05   Driver Version: 535.104.05   CUDA Version: 12.2     |
//! |-------------------------------+----------------------+----------------------+
//! | GPU  Name        Persistence-M| Bus-Id        Disp.A | Volatile Uncorr. ECC |
//! | Fan  Temp  Perf  Pwr:Usage/Cap|         Memory-Usage | GPU-Util  Compute M. |
//! |===============================+======================+======================|
//! |   0  NVIDIA A10          Off  | 00000000:00:1E.0 Off |                    0 |
//! |  0%   45C    P0   120W / 300W |  10240MiB / 24576MiB |     37%      Default |
//! +-------------------------------+----------------------+----------------------+
//! ```
//!
//! Each device occupies a header row (`|   0  NVIDIA A10 ...`) immediately
//! followed by a metrics row. This module only classifies lines and extracts
//! metrics; stitching them into snapshots is done by
//! [`crate::snapshot::SnapshotAccumulator`].

use regex::Regex;
use std::sync::LazyLock;

use super::types::{ClassifiedLine, DeviceMetrics};

/// Full-line capture timestamp, e.g. `2024-05-01 12:00:00`
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("Failed to compile regex")
});

/// Device header row: a bar, padding, the GPU index, then the device name
static DEVICE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\s+(\d+)\s+\S").expect("Failed to compile regex"));

/// Table framing rows
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\+-+|\|=+|\|\s*$)").expect("Failed to compile regex"));

static TEMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)C").expect("Failed to compile regex"));

static POWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)W\s*/\s*(\d+)W").expect("Failed to compile regex"));

static MEMORY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)MiB\s*/\s*(\d+)MiB").expect("Failed to compile regex"));

static UTILIZATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("Failed to compile regex"));

/// nvidia-smi capture log parser
pub struct NvidiaSmi;

impl NvidiaSmi {
    /// Banner printed at the top of every nvidia-smi table
    const BANNER: &'static str = "NVIDIA-SMI";

    /// Detect if content looks like repeated nvidia-smi captures
    pub fn detect(contents: &str) -> bool {
        if contents.contains(Self::BANNER) {
            return true;
        }

        let mut has_timestamp = false;
        let mut has_frame = false;
        for line in contents.lines() {
            match Self::classify(line) {
                ClassifiedLine::Timestamp(_) => has_timestamp = true,
                ClassifiedLine::Separator if line.starts_with('+') => has_frame = true,
                _ => {}
            }
            if has_timestamp && has_frame {
                return true;
            }
        }
        false
    }

    /// Classify one raw line.
    ///
    /// Checked in priority order: timestamp, device header, separator.
    /// Anything else is a candidate metrics line.
    pub fn classify(line: &str) -> ClassifiedLine {
        let line = line.trim_end_matches(['\n', '\r']);

        if TIMESTAMP_RE.is_match(line) {
            return ClassifiedLine::Timestamp(line.to_string());
        }

        if let Some(captures) = DEVICE_HEADER_RE.captures(line) {
            // The pattern guarantees digits, but not that they fit in a u32
            match captures[1].parse::<u32>() {
                Ok(index) => return ClassifiedLine::DeviceHeader(index),
                Err(e) => {
                    tracing::debug!("Device index out of range ({}): {}", e, line);
                    return ClassifiedLine::Candidate(line.to_string());
                }
            }
        }

        if SEPARATOR_RE.is_match(line) {
            return ClassifiedLine::Separator;
        }

        ClassifiedLine::Candidate(line.to_string())
    }

    /// Extract metrics from a device metrics row.
    ///
    /// Columns are split on `|`:
    /// - column 1: `Fan Temp Perf Pwr:Usage/Cap` (temperature, power draw/cap)
    /// - column 2: `Memory-Usage`
    /// - column 3: `GPU-Util Compute M.`
    ///
    /// Rows with fewer than four fields yield an all-`None` record.
    pub fn extract(text: &str) -> DeviceMetrics {
        let mut metrics = DeviceMetrics::default();

        let parts: Vec<&str> = text.split('|').map(str::trim).collect();
        if parts.len() < 4 {
            return metrics;
        }

        let power_col = parts[1];
        if let Some(caps) = TEMP_RE.captures(power_col) {
            metrics.temp_c = caps[1].parse().ok();
        }
        if let Some(caps) = POWER_RE.captures(power_col) {
            metrics.power_w = caps[1].parse().ok();
            metrics.power_capacity_w = caps[2].parse().ok();
        }

        if let Some(caps) = MEMORY_RE.captures(parts[2]) {
            metrics.memory_used_mib = caps[1].parse().ok();
            metrics.memory_total_mib = caps[2].parse().ok();
        }

        if let Some(caps) = UTILIZATION_RE.captures(parts[3]) {
            metrics.utilization_pct = caps[1].parse().ok();
        }

        metrics
    }
}
