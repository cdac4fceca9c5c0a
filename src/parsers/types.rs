use serde::Serialize;
use std::collections::BTreeMap;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// One input line after classification.
///
/// Produced fresh for every line and consumed immediately by the
/// snapshot accumulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedLine {
    /// A `YYYY-MM-DD HH:MM:SS` line opening a new capture
    Timestamp(String),
    /// A table row announcing which GPU index the next metrics line belongs to
    DeviceHeader(u32),
    /// Table framing: `+----`, `|====`, or an empty `|` row
    Separator,
    /// Anything else; only meaningful when a device header is pending
    Candidate(String),
}

/// The six per-device metrics, in column order.
///
/// The serialized name is the column suffix used in the wide table
/// (`gpu{N}_{suffix}`).
#[derive(Clone, Copy, Debug, EnumIter, IntoStaticStr, PartialEq, Eq, Hash)]
pub enum Metric {
    #[strum(serialize = "temp_c")]
    TempC,
    #[strum(serialize = "power_w")]
    PowerW,
    #[strum(serialize = "power_capacity_w")]
    PowerCapacityW,
    #[strum(serialize = "memory_used_mib")]
    MemoryUsedMib,
    #[strum(serialize = "memory_total_mib")]
    MemoryTotalMib,
    #[strum(serialize = "utilization_pct")]
    UtilizationPct,
}

impl Metric {
    /// All metrics in the fixed column order
    pub fn all() -> impl Iterator<Item = Metric> {
        Metric::iter()
    }

    /// Column suffix, e.g. `power_capacity_w`
    pub fn suffix(self) -> &'static str {
        self.into()
    }

    /// Column name for this metric on the given device
    pub fn column_name(self, device: u32) -> String {
        format!("gpu{}_{}", device, self.suffix())
    }
}

/// Metrics parsed from a single device row.
///
/// Every field is independently optional: a pattern that does not match
/// leaves its field `None`, which is the normal case for partial output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DeviceMetrics {
    pub temp_c: Option<u64>,
    pub power_w: Option<u64>,
    pub power_capacity_w: Option<u64>,
    pub memory_used_mib: Option<u64>,
    pub memory_total_mib: Option<u64>,
    pub utilization_pct: Option<u64>,
}

impl DeviceMetrics {
    /// Look up a single metric
    pub fn get(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::TempC => self.temp_c,
            Metric::PowerW => self.power_w,
            Metric::PowerCapacityW => self.power_capacity_w,
            Metric::MemoryUsedMib => self.memory_used_mib,
            Metric::MemoryTotalMib => self.memory_total_mib,
            Metric::UtilizationPct => self.utilization_pct,
        }
    }

    /// True when no pattern matched at all
    pub fn is_empty(&self) -> bool {
        Metric::all().all(|m| self.get(m).is_none())
    }
}

/// One timestamped capture of the device table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Timestamp exactly as it appeared in the log
    pub timestamp: String,
    /// Device index -> metrics for every device reported in this capture
    pub devices: BTreeMap<u32, DeviceMetrics>,
}

impl Snapshot {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            devices: BTreeMap::new(),
        }
    }
}
