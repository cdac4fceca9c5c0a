pub mod nvidia_smi;
pub mod types;

pub use nvidia_smi::NvidiaSmi;
pub use types::{ClassifiedLine, DeviceMetrics, Metric, Snapshot};
