//! smilog - Convert repeated nvidia-smi table captures into a spreadsheet
//!
//! A long-running GPU test typically logs `date` followed by `nvidia-smi`
//! every few seconds. This library turns such a log into a wide time series
//! table: one row per capture, and for every GPU ever seen its temperature,
//! power draw and cap, memory used and total, and utilization.
//!
//! ## Module Structure
//!
//! - [`parsers`] - Line classification and metrics extraction for nvidia-smi tables
//! - [`snapshot`] - Folding classified lines into one snapshot per capture
//! - [`schema`] - Building the wide table with a stable column set
//! - [`export`] - Writing the table to an `.xlsx` sheet
//! - [`convert`] - The end-to-end pipeline and its error types
//! - [`settings`] - User settings persistence

pub mod convert;
pub mod export;
pub mod parsers;
pub mod schema;
pub mod settings;
pub mod snapshot;
