//! Reconciliation of downtime events and utilization days into one fact table.

use crate::config::CoverageMode;
use crate::models::{FactTable, NormalizedRow, StopRecord};
use crate::pipeline::week::{self, TimestampParser};
use crate::registry::GroupRegistry;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info};

/// The fact table plus what the merge discarded on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub facts: FactTable,
    /// Utilization rows outside the downtime observation window
    pub outside_coverage: usize,
    /// Rows with zero or missing minutes
    pub zero_or_null_dropped: usize,
    /// Rows dropped by week assignment
    pub unparseable_dropped: usize,
    pub sentinel_applied: bool,
}

/// Observation window of the downtime source
enum Coverage {
    Pairs(HashSet<(NaiveDate, String)>),
    Independent {
        dates: HashSet<NaiveDate>,
        machines: HashSet<String>,
    },
}

impl Coverage {
    fn from_downtime(rows: &[NormalizedRow], parser: &TimestampParser, mode: CoverageMode) -> Self {
        let dated = rows
            .iter()
            .filter_map(|row| parser.parse_date(&row.started_at).map(|date| (date, row)));

        match mode {
            CoverageMode::DateMachinePairs => Self::Pairs(
                dated
                    .map(|(date, row)| (date, row.machine_id.clone()))
                    .collect(),
            ),
            CoverageMode::DatesAndMachines => {
                let mut dates = HashSet::new();
                let mut machines = HashSet::new();
                for (date, row) in dated {
                    dates.insert(date);
                    machines.insert(row.machine_id.clone());
                }
                Self::Independent { dates, machines }
            }
        }
    }

    fn covers(&self, date: NaiveDate, machine_id: &str) -> bool {
        match self {
            Self::Pairs(pairs) => pairs.contains(&(date, machine_id.to_string())),
            Self::Independent { dates, machines } => {
                dates.contains(&date) && machines.contains(machine_id)
            }
        }
    }
}

/// Merge normalized downtime and utilization rows
///
/// Utilization rows are restricted to the downtime coverage, both tables
/// are concatenated, zero or missing durations are dropped, missing seconds
/// are backfilled from minutes, and group and week keys are attached.
/// Utilization rows whose date cannot be parsed bypass the coverage check
/// and are counted by week assignment instead.
pub fn merge(
    downtime: Vec<NormalizedRow>,
    utilization: Vec<NormalizedRow>,
    registry: &GroupRegistry,
    parser: &TimestampParser,
    mode: CoverageMode,
) -> MergeOutcome {
    let coverage = Coverage::from_downtime(&downtime, parser, mode);

    let utilization_total = utilization.len();
    let covered: Vec<NormalizedRow> = utilization
        .into_iter()
        .filter(|row| match parser.parse_date(&row.started_at) {
            Some(date) => coverage.covers(date, &row.machine_id),
            // Undated rows are dropped or sentineled by the week assigner
            None => true,
        })
        .collect();
    let outside_coverage = utilization_total - covered.len();
    debug!(
        "Utilization rows inside downtime coverage: {} of {}",
        covered.len(),
        utilization_total
    );

    let combined_total = downtime.len() + covered.len();
    let combined: Vec<NormalizedRow> = downtime
        .into_iter()
        .chain(covered)
        .filter(|row| row.duration_minutes.is_some_and(|minutes| minutes != 0))
        .map(backfill_seconds)
        .collect();
    let zero_or_null_dropped = combined_total - combined.len();

    let assignment = week::assign(combined, parser, |row: &NormalizedRow| {
        row.started_at.as_str()
    });

    let records: Vec<StopRecord> = assignment
        .rows
        .into_iter()
        .filter_map(|dated| {
            let row = dated.row;
            let duration_seconds = row.duration_seconds?;
            let duration_minutes = row.duration_minutes?;
            Some(StopRecord {
                group: registry.resolve(&row.machine_id),
                machine_id: row.machine_id,
                stop_name: row.stop_name,
                started_at: dated.date,
                duration_seconds,
                duration_minutes,
                week: dated.week,
                metrics: row.metrics,
            })
        })
        .collect();

    info!(
        "Merged fact table: {} rows ({} utilization rows outside coverage, {} zero/null durations)",
        records.len(),
        outside_coverage,
        zero_or_null_dropped
    );

    MergeOutcome {
        facts: FactTable::new(records),
        outside_coverage,
        zero_or_null_dropped,
        unparseable_dropped: assignment.dropped,
        sentinel_applied: assignment.sentinel_applied,
    }
}

/// Operating-time rows carry minutes only; derive seconds from them
fn backfill_seconds(mut row: NormalizedRow) -> NormalizedRow {
    if row.is_operating_time() && row.duration_seconds.is_none() {
        row.duration_seconds = row.duration_minutes.map(|minutes| minutes * 60);
    }
    row
}
