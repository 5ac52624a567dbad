//! Weekly OEE scorecards.

use crate::models::{OeeMetrics, StopRecord, WeekSeries, WeekStamp};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum OeeScope {
    Overall,
    Group,
    Machine,
}

/// Mean metrics of one entity in one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OeeRow {
    pub week: WeekStamp,
    pub scope: OeeScope,
    /// Group name, machine id, or empty for the overall scope
    pub entity: String,
    pub metrics: OeeMetrics,
}

/// OEE means keyed by week, scope and entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OeeRollup {
    rows: Vec<OeeRow>,
}

impl OeeRollup {
    pub fn rows(&self) -> &[OeeRow] {
        &self.rows
    }

    pub fn get(&self, week: WeekStamp, scope: OeeScope, entity: &str) -> Option<&OeeMetrics> {
        self.rows
            .iter()
            .find(|row| row.week == week && row.scope == scope && row.entity == entity)
            .map(|row| &row.metrics)
    }

    pub fn overall(&self, week: WeekStamp) -> Option<&OeeMetrics> {
        self.get(week, OeeScope::Overall, "")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Running sums of the populated values of each metric
#[derive(Debug, Clone, Copy, Default)]
struct MetricMeans {
    sums: [f64; 4],
    counts: [usize; 4],
}

impl MetricMeans {
    fn add(&mut self, metrics: &OeeMetrics) {
        let values = [
            metrics.oee,
            metrics.performance,
            metrics.availability,
            metrics.quality,
        ];
        for (slot, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                self.sums[slot] += value;
                self.counts[slot] += 1;
            }
        }
    }

    fn mean(&self, slot: usize) -> Option<f64> {
        (self.counts[slot] > 0).then(|| self.sums[slot] / self.counts[slot] as f64)
    }

    fn finish(&self) -> Option<OeeMetrics> {
        let metrics = OeeMetrics {
            oee: self.mean(0),
            performance: self.mean(1),
            availability: self.mean(2),
            quality: self.mean(3),
        };
        (!metrics.is_empty()).then_some(metrics)
    }
}

/// Mean of each metric per week, overall, per group and per machine
///
/// Missing values are ignored. An entity-week without any value is absent.
/// Unassigned machines count toward overall and machine scopes only.
pub fn oee_rollup(rows: &[StopRecord], weeks: &WeekSeries) -> OeeRollup {
    let mut result = Vec::new();

    for week in weeks.iter().copied() {
        let mut overall = MetricMeans::default();
        let mut groups: BTreeMap<&str, MetricMeans> = BTreeMap::new();
        let mut machines: BTreeMap<&str, MetricMeans> = BTreeMap::new();

        for record in rows.iter().filter(|record| record.week == week) {
            overall.add(&record.metrics);
            if let Some(group) = record.group.group_name() {
                groups.entry(group).or_default().add(&record.metrics);
            }
            machines
                .entry(record.machine_id.as_str())
                .or_default()
                .add(&record.metrics);
        }

        if let Some(metrics) = overall.finish() {
            result.push(OeeRow {
                week,
                scope: OeeScope::Overall,
                entity: String::new(),
                metrics,
            });
        }
        for (scope, entities) in [(OeeScope::Group, groups), (OeeScope::Machine, machines)] {
            for (entity, means) in entities {
                if let Some(metrics) = means.finish() {
                    result.push(OeeRow {
                        week,
                        scope,
                        entity: entity.to_string(),
                        metrics,
                    });
                }
            }
        }
    }

    OeeRollup { rows: result }
}
