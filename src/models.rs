//! Core data structures and types for downtime processing.
//!
//! Defines the typed source rows, the unified stop record (one row of the
//! fact table), the tagged week and group outcomes, and the run-level
//! collections derived from the fact table.

use crate::constants::{OPERATING_TIME, UNASSIGNED_GROUP, UNRESOLVED_WEEK_LABEL};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Rows that carry a machine identifier
pub trait MachineKeyed {
    fn machine_id(&self) -> &str;
}

/// One record of the downtime event export, as read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DowntimeSourceRow {
    pub machine_id: String,
    pub stop_name: String,
    pub started_at: String,
    pub ended_at: String,
}

/// One record of the daily utilization export, as read
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UtilizationSourceRow {
    pub machine_id: String,
    pub date: String,
    pub total_time: Option<f64>,
    pub planned_stop: Option<f64>,
    pub unplanned_stop: Option<f64>,
    pub metrics: OeeMetrics,
}

impl MachineKeyed for DowntimeSourceRow {
    fn machine_id(&self) -> &str {
        &self.machine_id
    }
}

impl MachineKeyed for UtilizationSourceRow {
    fn machine_id(&self) -> &str {
        &self.machine_id
    }
}

/// The four OEE-family ratios
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OeeMetrics {
    pub oee: Option<f64>,
    pub performance: Option<f64>,
    pub availability: Option<f64>,
    pub quality: Option<f64>,
}

impl OeeMetrics {
    /// True when no ratio is populated
    pub fn is_empty(&self) -> bool {
        self.oee.is_none()
            && self.performance.is_none()
            && self.availability.is_none()
            && self.quality.is_none()
    }
}

/// Elapsed time of a single stoppage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopDuration {
    pub seconds: i64,
    /// Truncated, never rounded
    pub minutes: i64,
}

/// A row in the common schema shared by both sources, before merging
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub machine_id: String,
    pub stop_name: String,
    /// Raw start timestamp text; parsed during merge
    pub started_at: String,
    pub duration_seconds: Option<i64>,
    pub duration_minutes: Option<i64>,
    pub metrics: OeeMetrics,
}

impl NormalizedRow {
    pub fn is_operating_time(&self) -> bool {
        self.stop_name == OPERATING_TIME
    }
}

impl MachineKeyed for NormalizedRow {
    fn machine_id(&self) -> &str {
        &self.machine_id
    }
}

/// ISO week key of a record, or the unresolved sentinel
///
/// `Unresolved` is only produced when the whole timestamp column failed
/// to parse. Callers must match on it rather than compare year values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeekStamp {
    Iso { year: i32, week: u32 },
    Unresolved,
}

impl WeekStamp {
    pub fn iso(year: i32, week: u32) -> Self {
        Self::Iso { year, week }
    }

    pub fn week_number(&self) -> u32 {
        match self {
            Self::Iso { week, .. } => *week,
            Self::Unresolved => 1,
        }
    }

    pub fn iso_year(&self) -> Option<i32> {
        match self {
            Self::Iso { year, .. } => Some(*year),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Iso { .. })
    }
}

impl fmt::Display for WeekStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iso { year, week } => write!(f, "{year}-{week}"),
            Self::Unresolved => f.write_str(UNRESOLVED_WEEK_LABEL),
        }
    }
}

/// Group membership of a machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupAssignment {
    Group(String),
    Unassigned,
}

impl GroupAssignment {
    pub fn name(&self) -> &str {
        match self {
            Self::Group(name) => name,
            Self::Unassigned => UNASSIGNED_GROUP,
        }
    }

    pub fn group_name(&self) -> Option<&str> {
        match self {
            Self::Group(name) => Some(name),
            Self::Unassigned => None,
        }
    }
}

impl fmt::Display for GroupAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the unified fact table
///
/// Created once during merge and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub machine_id: String,
    pub stop_name: String,
    /// Date-only start of the stoppage (or of the utilization day)
    pub started_at: Option<NaiveDate>,
    pub duration_seconds: i64,
    pub duration_minutes: i64,
    pub group: GroupAssignment,
    pub week: WeekStamp,
    pub metrics: OeeMetrics,
}

impl StopRecord {
    pub fn is_operating_time(&self) -> bool {
        self.stop_name == OPERATING_TIME
    }
}

impl MachineKeyed for StopRecord {
    fn machine_id(&self) -> &str {
        &self.machine_id
    }
}

/// Machines flagged out of service for the analysis window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultList {
    machines: HashSet<String>,
}

impl FaultList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, machine_id: &str) -> bool {
        self.machines.contains(machine_id)
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }
}

impl<S: Into<String>> FromIterator<S> for FaultList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            machines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Registered, not fault-flagged machine count per group
///
/// Used as the divisor for per-machine normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupMachineCounts(BTreeMap<String, usize>);

impl GroupMachineCounts {
    pub fn new(counts: BTreeMap<String, usize>) -> Self {
        Self(counts)
    }

    pub fn get(&self, group: &str) -> Option<usize> {
        self.0.get(group).copied()
    }

    /// Divisor for a group, or `None` when missing or zero
    pub fn divisor(&self, group: &str) -> Option<usize> {
        self.get(group).filter(|count| *count > 0)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(group, count)| (group.as_str(), *count))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

/// Distinct weeks of the fact table, most recent analysis week first
///
/// Weeks numbered 10 and above sort before weeks below 10, then by week
/// number descending, then by ISO year descending. The unresolved sentinel
/// always sorts last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSeries(Vec<WeekStamp>);

impl WeekSeries {
    pub fn from_records(records: &[StopRecord]) -> Self {
        let distinct: BTreeSet<WeekStamp> = records.iter().map(|record| record.week).collect();
        let mut weeks: Vec<WeekStamp> = distinct.into_iter().collect();
        weeks.sort_by(compare_analysis_order);
        Self(weeks)
    }

    /// The current analysis week
    pub fn current(&self) -> Option<WeekStamp> {
        self.0.first().copied()
    }

    pub fn as_slice(&self) -> &[WeekStamp] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeekStamp> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn compare_analysis_order(a: &WeekStamp, b: &WeekStamp) -> Ordering {
    match (a, b) {
        (WeekStamp::Unresolved, WeekStamp::Unresolved) => Ordering::Equal,
        (WeekStamp::Unresolved, _) => Ordering::Greater,
        (_, WeekStamp::Unresolved) => Ordering::Less,
        (
            WeekStamp::Iso {
                year: year_a,
                week: week_a,
            },
            WeekStamp::Iso {
                year: year_b,
                week: week_b,
            },
        ) => (*week_a < 10)
            .cmp(&(*week_b < 10))
            .then_with(|| week_b.cmp(week_a))
            .then_with(|| year_b.cmp(year_a)),
    }
}

/// The unified fact table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactTable {
    records: Vec<StopRecord>,
}

impl FactTable {
    pub fn new(records: Vec<StopRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StopRecord] {
        &self.records
    }

    /// Rows of a single week, as a new table
    pub fn for_week(&self, week: WeekStamp) -> Vec<StopRecord> {
        self.records
            .iter()
            .filter(|record| record.week == week)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
