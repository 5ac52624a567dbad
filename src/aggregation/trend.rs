//! Week-over-week trends of each entity's largest causes.

use crate::aggregation::buckets::CauseBuckets;
use crate::models::{StopRecord, WeekStamp};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Which column a trend table is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendEntity {
    Group,
    Machine,
}

impl TrendEntity {
    fn key(self, record: &StopRecord) -> Option<&str> {
        match self {
            Self::Group => record.group.group_name(),
            Self::Machine => Some(record.machine_id.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendRow {
    pub entity: String,
    pub week: WeekStamp,
    pub cause: String,
    pub seconds: i64,
    pub minutes: i64,
}

/// Full history of each entity's top `n` causes in the observed week
///
/// Causes are bucketed with `buckets` and summed per (entity, week, cause).
/// The top `n` per entity are picked from `observed_week` by seconds, ties
/// keeping key order. Every week of those (entity, cause) pairs is returned,
/// largest first. Unassigned machines never form a group entity.
pub fn top_n_trend(
    rows: &[StopRecord],
    observed_week: WeekStamp,
    entity: TrendEntity,
    n: usize,
    buckets: &CauseBuckets,
) -> Vec<TrendRow> {
    let mut sums: BTreeMap<(&str, WeekStamp, &str), i64> = BTreeMap::new();
    for record in rows {
        let Some(key) = entity.key(record) else {
            continue;
        };
        let cause = buckets.bucket(&record.stop_name);
        *sums.entry((key, record.week, cause)).or_default() += record.duration_seconds;
    }

    let mut observed: Vec<(&str, &str, i64)> = sums
        .iter()
        .filter(|((_, week, _), _)| *week == observed_week)
        .map(|((key, _, cause), seconds)| (*key, *cause, *seconds))
        .collect();
    observed.sort_by(|a, b| a.0.cmp(b.0).then_with(|| b.2.cmp(&a.2)));

    let mut taken: BTreeMap<&str, usize> = BTreeMap::new();
    let mut top: HashSet<(&str, &str)> = HashSet::new();
    for (key, cause, _) in observed {
        let count = taken.entry(key).or_default();
        if *count < n {
            top.insert((key, cause));
            *count += 1;
        }
    }
    debug!(
        "{:?} trend: {} top pairs for week {}",
        entity,
        top.len(),
        observed_week
    );

    let mut trend: Vec<TrendRow> = sums
        .into_iter()
        .filter(|((key, _, cause), _)| top.contains(&(*key, *cause)))
        .map(|((key, week, cause), seconds)| TrendRow {
            entity: key.to_string(),
            week,
            cause: cause.to_string(),
            seconds,
            minutes: seconds / 60,
        })
        .collect();
    trend.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    trend
}
