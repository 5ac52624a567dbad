//! Data preparation pipeline.
//!
//! Raw tables flow through the row sanitizer, the duration calculator, the
//! fault filter and the dataset merger (which applies the group registry and
//! the week assigner). The result is the immutable fact table plus the week
//! ordering and the per-group machine counts every aggregation needs.

pub mod duration;
pub mod fault_filter;
pub mod merger;
pub mod sanitizer;
pub mod week;

#[cfg(test)]
pub mod tests;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::{
    DowntimeSourceRow, FactTable, FaultList, GroupMachineCounts, UtilizationSourceRow, WeekSeries,
};
use crate::reader;
use crate::registry::GroupRegistry;
use std::path::PathBuf;
use tracing::{info, warn};

pub use week::TimestampParser;

/// Paths of the three inputs of a run
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInputs {
    pub downtime: PathBuf,
    pub utilization: PathBuf,
    /// Optional list of fault-flagged machines
    pub faulty: Option<PathBuf>,
}

/// Row accounting for one preparation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreparationStats {
    pub downtime_rows_read: usize,
    pub utilization_rows_read: usize,
    pub downtime_trailing_stripped: usize,
    pub utilization_trailing_stripped: usize,
    pub invalid_intervals: usize,
    pub fault_filtered: usize,
    pub outside_coverage: usize,
    pub zero_or_null_dropped: usize,
    pub unparseable_dropped: usize,
    pub sentinel_applied: bool,
    pub fact_rows: usize,
}

impl PreparationStats {
    /// Total rows discarded at row level
    pub fn rows_dropped(&self) -> usize {
        self.downtime_trailing_stripped
            + self.utilization_trailing_stripped
            + self.invalid_intervals
            + self.fault_filtered
            + self.outside_coverage
            + self.zero_or_null_dropped
            + self.unparseable_dropped
    }

    pub fn log_summary(&self) {
        info!(
            "Rows read: {} downtime, {} utilization",
            self.downtime_rows_read, self.utilization_rows_read
        );
        info!(
            "Trailing rows stripped: {} downtime, {} utilization",
            self.downtime_trailing_stripped, self.utilization_trailing_stripped
        );
        info!(
            "Rows dropped: {} invalid intervals, {} fault-flagged, {} outside coverage, {} zero/null duration, {} unparseable timestamps",
            self.invalid_intervals,
            self.fault_filtered,
            self.outside_coverage,
            self.zero_or_null_dropped,
            self.unparseable_dropped
        );
        if self.sentinel_applied {
            warn!("Week assignment fell back to the unresolved week for every row");
        }
        info!("Fact table rows: {}", self.fact_rows);
    }
}

/// Everything the aggregation engine and the report consume
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub facts: FactTable,
    pub weeks: WeekSeries,
    pub group_counts: GroupMachineCounts,
    pub stats: PreparationStats,
}

/// Read the inputs from disk and build the fact table
pub fn prepare(config: &AnalysisConfig, inputs: &SourceInputs) -> Result<PreparedData> {
    let downtime = reader::read_downtime_table(&inputs.downtime, config)?;
    let utilization = reader::read_utilization_table(&inputs.utilization, config)?;
    let fault_list = reader::read_fault_list(inputs.faulty.as_deref());

    Ok(prepare_rows(config, downtime, utilization, &fault_list))
}

/// Build the fact table from already loaded source rows
pub fn prepare_rows(
    config: &AnalysisConfig,
    downtime: Vec<DowntimeSourceRow>,
    utilization: Vec<UtilizationSourceRow>,
    fault_list: &FaultList,
) -> PreparedData {
    let registry = GroupRegistry::new(&config.groups);
    let parser = TimestampParser::new(&config.timestamps);
    let mut stats = PreparationStats {
        downtime_rows_read: downtime.len(),
        utilization_rows_read: utilization.len(),
        ..Default::default()
    };

    let (downtime, stripped) =
        sanitizer::strip_trailing_invalid(downtime, &registry, config.trailing_scan_limit);
    stats.downtime_trailing_stripped = stripped;
    let (utilization, stripped) =
        sanitizer::strip_trailing_invalid(utilization, &registry, config.trailing_scan_limit);
    stats.utilization_trailing_stripped = stripped;

    let normalized = sanitizer::normalize_downtime_schema(downtime, &parser);
    stats.invalid_intervals = normalized.invalid_intervals;
    let utilization = sanitizer::normalize_utilization_schema(utilization);

    let before = normalized.rows.len() + utilization.len();
    let downtime = fault_filter::exclude(normalized.rows, fault_list);
    let utilization = fault_filter::exclude(utilization, fault_list);
    stats.fault_filtered = before - downtime.len() - utilization.len();

    let outcome = merger::merge(downtime, utilization, &registry, &parser, config.coverage);
    stats.outside_coverage = outcome.outside_coverage;
    stats.zero_or_null_dropped = outcome.zero_or_null_dropped;
    stats.unparseable_dropped = outcome.unparseable_dropped;
    stats.sentinel_applied = outcome.sentinel_applied;
    stats.fact_rows = outcome.facts.len();

    let weeks = WeekSeries::from_records(outcome.facts.records());
    let group_counts = registry.eligible_counts(fault_list);

    stats.log_summary();

    PreparedData {
        facts: outcome.facts,
        weeks,
        group_counts,
        stats,
    }
}
