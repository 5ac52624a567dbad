//! Row sanitizing and schema normalization.
//!
//! Exports frequently end with subtotal or signature rows that carry free
//! text in the machine column. Those are stripped here, and both sources are
//! brought into the shared `NormalizedRow` layout.

use crate::constants::OPERATING_TIME;
use crate::models::{
    DowntimeSourceRow, MachineKeyed, NormalizedRow, OeeMetrics, UtilizationSourceRow,
};
use crate::pipeline::duration;
use crate::pipeline::week::TimestampParser;
use crate::registry::GroupRegistry;
use tracing::{debug, warn};

/// Drop trailing rows whose machine id is not registered
///
/// Stops at the first registered id from the end or after `limit` drops,
/// whichever comes first. Returns the kept rows and the number removed.
pub fn strip_trailing_invalid<R: MachineKeyed>(
    mut rows: Vec<R>,
    registry: &GroupRegistry,
    limit: usize,
) -> (Vec<R>, usize) {
    let mut stripped = 0;
    while stripped < limit {
        match rows.last() {
            Some(row) if !registry.is_registered(row.machine_id()) => {
                debug!("Stripping trailing row with key '{}'", row.machine_id());
                rows.pop();
                stripped += 1;
            }
            _ => break,
        }
    }
    (rows, stripped)
}

/// Downtime rows in the shared layout, plus the count of rejected intervals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DowntimeNormalization {
    pub rows: Vec<NormalizedRow>,
    pub invalid_intervals: usize,
}

/// Compute each downtime record's duration and move it into the shared layout
///
/// Records with an unparseable or inverted interval are dropped and counted.
pub fn normalize_downtime_schema(
    rows: Vec<DowntimeSourceRow>,
    parser: &TimestampParser,
) -> DowntimeNormalization {
    let mut invalid_intervals = 0;
    let mut normalized = Vec::with_capacity(rows.len());

    for row in rows {
        match duration::from_interval(&row.started_at, &row.ended_at, parser) {
            Ok(elapsed) => normalized.push(NormalizedRow {
                machine_id: row.machine_id,
                stop_name: row.stop_name,
                started_at: row.started_at,
                duration_seconds: Some(elapsed.seconds),
                duration_minutes: Some(elapsed.minutes),
                metrics: OeeMetrics::default(),
            }),
            Err(e) => {
                debug!("Dropping downtime row for {}: {}", row.machine_id, e);
                invalid_intervals += 1;
            }
        }
    }

    if invalid_intervals > 0 {
        warn!(
            "Dropped {} downtime rows with invalid intervals",
            invalid_intervals
        );
    }

    DowntimeNormalization {
        rows: normalized,
        invalid_intervals,
    }
}

/// Move utilization rows into the shared layout
///
/// Every row becomes an `OPERATING TIME` record whose minutes are the day's
/// uptime. No seconds value is set; the merger backfills it.
pub fn normalize_utilization_schema(rows: Vec<UtilizationSourceRow>) -> Vec<NormalizedRow> {
    rows.into_iter()
        .map(|row| NormalizedRow {
            duration_minutes: duration::from_utilization(
                row.total_time,
                row.planned_stop,
                row.unplanned_stop,
            ),
            machine_id: row.machine_id,
            stop_name: OPERATING_TIME.to_string(),
            started_at: row.date,
            duration_seconds: None,
            metrics: row.metrics,
        })
        .collect()
}
