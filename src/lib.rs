//! Downtime Processor Library
//!
//! Reconciles a factory's machine downtime events with its daily
//! utilization export and rolls them up into weekly downtime and OEE
//! report tables.
//!
//! This library provides tools for:
//! - Reading both CSV exports with configurable column names
//! - Cleaning trailing junk rows and invalid stop intervals
//! - Merging both exports into one fact table keyed by ISO week and group
//! - Bucketing free-text stop names into canonical causes
//! - Aggregating totals, per-machine averages, top-N trends and OEE means
//! - Writing every report table as CSV

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod processor;
pub mod reader;
pub mod registry;
pub mod report;

pub use config::AnalysisConfig;
pub use error::{DowntimeError, Result};
pub use models::{FactTable, StopRecord, WeekSeries, WeekStamp};
pub use pipeline::{PreparedData, SourceInputs, prepare, prepare_rows};
pub use processor::{ReportProcessor, ReportSummary};
pub use report::{ReportTables, build_report, write_report};
