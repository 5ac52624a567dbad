//! Duration rollups by cause, group and machine.

use crate::aggregation::buckets::CauseBuckets;
use crate::models::{GroupAssignment, GroupMachineCounts, StopRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summed duration of one cause bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseTotal {
    pub cause: String,
    pub seconds: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub group: String,
    pub seconds: i64,
    pub minutes: i64,
}

/// A group's downtime normalized to one eligible machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverage {
    pub group: String,
    pub machine_count: usize,
    pub total_seconds: i64,
    pub average_seconds: f64,
    pub average_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineTotal {
    pub machine_id: String,
    pub group: String,
    pub seconds: i64,
    pub minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineCauseTotal {
    pub machine_id: String,
    pub cause: String,
    pub seconds: i64,
    pub minutes: i64,
}

/// Minutes per raw stop name for one machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineStopBreakdown {
    pub machine_id: String,
    pub stop_name: String,
    pub minutes: i64,
}

fn minutes_of(seconds: i64) -> i64 {
    seconds / 60
}

fn stoppages(rows: &[StopRecord]) -> impl Iterator<Item = &StopRecord> {
    rows.iter().filter(|record| !record.is_operating_time())
}

fn sorted_by_seconds_desc(sums: BTreeMap<String, i64>) -> Vec<CauseTotal> {
    let mut totals: Vec<CauseTotal> = sums
        .into_iter()
        .map(|(cause, seconds)| CauseTotal {
            cause,
            seconds,
            minutes: minutes_of(seconds),
        })
        .collect();
    totals.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    totals
}

/// Seconds per cause bucket, largest first
pub fn total_by_cause(rows: &[StopRecord], buckets: &CauseBuckets) -> Vec<CauseTotal> {
    let mut sums: BTreeMap<String, i64> = BTreeMap::new();
    for record in rows {
        *sums
            .entry(buckets.bucket(&record.stop_name).to_string())
            .or_default() += record.duration_seconds;
    }
    sorted_by_seconds_desc(sums)
}

/// Stoppage seconds per registered group, by group name
pub fn total_by_group(rows: &[StopRecord]) -> Vec<GroupTotal> {
    let mut sums: BTreeMap<String, i64> = BTreeMap::new();
    for record in stoppages(rows) {
        if let Some(group) = record.group.group_name() {
            *sums.entry(group.to_string()).or_default() += record.duration_seconds;
        }
    }

    sums.into_iter()
        .map(|(group, seconds)| GroupTotal {
            group,
            seconds,
            minutes: minutes_of(seconds),
        })
        .collect()
}

/// Group stoppage totals divided by the group's eligible machine count
///
/// Groups without a usable divisor are left out.
pub fn per_machine_group_average(
    rows: &[StopRecord],
    counts: &GroupMachineCounts,
) -> Vec<GroupAverage> {
    total_by_group(rows)
        .into_iter()
        .filter_map(|total| {
            let machine_count = counts.divisor(&total.group)?;
            let average_seconds = total.seconds as f64 / machine_count as f64;
            Some(GroupAverage {
                group: total.group,
                machine_count,
                total_seconds: total.seconds,
                average_seconds,
                average_minutes: (average_seconds / 60.0).trunc() as i64,
            })
        })
        .collect()
}

/// Stoppage seconds per machine, smallest first
///
/// The largest offenders sit at the tail.
pub fn per_machine_total(rows: &[StopRecord]) -> Vec<MachineTotal> {
    let mut sums: BTreeMap<&str, (&GroupAssignment, i64)> = BTreeMap::new();
    for record in stoppages(rows) {
        sums.entry(record.machine_id.as_str())
            .or_insert((&record.group, 0))
            .1 += record.duration_seconds;
    }

    let mut totals: Vec<MachineTotal> = sums
        .into_iter()
        .map(|(machine_id, (group, seconds))| MachineTotal {
            machine_id: machine_id.to_string(),
            group: group.name().to_string(),
            seconds,
            minutes: minutes_of(seconds),
        })
        .collect();
    totals.sort_by_key(|total| total.seconds);
    totals
}

/// Seconds per (machine, cause bucket); machines in order, largest cause first
pub fn per_machine_per_cause(
    rows: &[StopRecord],
    buckets: &CauseBuckets,
) -> Vec<MachineCauseTotal> {
    let mut sums: BTreeMap<(&str, String), i64> = BTreeMap::new();
    for record in rows {
        let cause = buckets.bucket(&record.stop_name).to_string();
        *sums.entry((record.machine_id.as_str(), cause)).or_default() += record.duration_seconds;
    }

    let mut totals: Vec<MachineCauseTotal> = sums
        .into_iter()
        .map(|((machine_id, cause), seconds)| MachineCauseTotal {
            machine_id: machine_id.to_string(),
            cause,
            seconds,
            minutes: minutes_of(seconds),
        })
        .collect();
    totals.sort_by(|a, b| {
        a.machine_id
            .cmp(&b.machine_id)
            .then_with(|| b.seconds.cmp(&a.seconds))
    });
    totals
}

/// Cause mix of one representative machine of a group
///
/// Every row of the group is divided by the eligible machine count, with
/// integer truncation, before bucketing. A group without a usable divisor
/// yields an empty table.
pub fn part_average_stop_times(
    rows: &[StopRecord],
    group: &str,
    counts: &GroupMachineCounts,
    buckets: &CauseBuckets,
) -> Vec<CauseTotal> {
    let Some(divisor) = counts.divisor(group) else {
        return Vec::new();
    };
    let divisor = divisor as i64;

    let mut sums: BTreeMap<String, i64> = BTreeMap::new();
    for record in rows.iter().filter(|record| record.group.name() == group) {
        *sums
            .entry(buckets.bucket(&record.stop_name).to_string())
            .or_default() += record.duration_seconds / divisor;
    }
    sorted_by_seconds_desc(sums)
}

/// Per-machine minutes by raw stop name, for machines with positive downtime
pub fn machine_stop_breakdown(rows: &[StopRecord]) -> Vec<MachineStopBreakdown> {
    let mut per_machine: BTreeMap<&str, BTreeMap<&str, i64>> = BTreeMap::new();
    for record in stoppages(rows) {
        *per_machine
            .entry(record.machine_id.as_str())
            .or_default()
            .entry(record.stop_name.as_str())
            .or_default() += record.duration_minutes;
    }

    let mut breakdown = Vec::new();
    for (machine_id, stops) in per_machine {
        if stops.values().sum::<i64>() <= 0 {
            continue;
        }
        let mut entries: Vec<MachineStopBreakdown> = stops
            .into_iter()
            .map(|(stop_name, minutes)| MachineStopBreakdown {
                machine_id: machine_id.to_string(),
                stop_name: stop_name.to_string(),
                minutes,
            })
            .collect();
        entries.sort_by(|a, b| b.minutes.cmp(&a.minutes));
        breakdown.extend(entries);
    }
    breakdown
}
