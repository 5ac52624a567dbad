//! Stoppage duration calculation.

use crate::error::{DowntimeError, Result};
use crate::models::StopDuration;
use crate::pipeline::week::TimestampParser;

impl StopDuration {
    /// Whole minutes are truncated, never rounded
    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            minutes: seconds / 60,
        }
    }
}

/// Elapsed time between two timestamp cells
///
/// Fails when either side cannot be parsed or the interval is inverted.
pub fn from_interval(start: &str, end: &str, parser: &TimestampParser) -> Result<StopDuration> {
    let started = parser
        .parse(start)
        .ok_or_else(|| DowntimeError::invalid_interval(start, end, "unparseable start"))?;
    let ended = parser
        .parse(end)
        .ok_or_else(|| DowntimeError::invalid_interval(start, end, "unparseable end"))?;

    if ended < started {
        return Err(DowntimeError::invalid_interval(
            start,
            end,
            "end precedes start",
        ));
    }

    Ok(StopDuration::from_seconds((ended - started).num_seconds()))
}

/// Uptime minutes of a utilization day
///
/// May be negative when the export is inconsistent; that value is passed
/// through untouched. Any missing input yields `None`.
pub fn from_utilization(
    total_time: Option<f64>,
    planned_stop: Option<f64>,
    unplanned_stop: Option<f64>,
) -> Option<i64> {
    let minutes = total_time? - planned_stop? - unplanned_stop?;
    Some(minutes.trunc() as i64)
}
