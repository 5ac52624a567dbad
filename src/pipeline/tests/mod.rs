//! Tests for the preparation pipeline
//!
//! Covers each stage in isolation and the assembled `prepare_rows` flow.

pub mod prepare_tests;

use crate::config::{AnalysisConfig, GroupDefinition};
use crate::models::{DowntimeSourceRow, NormalizedRow, OeeMetrics, UtilizationSourceRow};
use crate::registry::GroupRegistry;

/// Two lines: LINE A holds M1..M3, LINE B holds M4
pub fn test_groups() -> Vec<GroupDefinition> {
    vec![
        GroupDefinition {
            name: "LINE A".to_string(),
            machines: vec!["M1".to_string(), "M2".to_string(), "M3".to_string()],
        },
        GroupDefinition {
            name: "LINE B".to_string(),
            machines: vec!["M4".to_string()],
        },
    ]
}

pub fn test_registry() -> GroupRegistry {
    GroupRegistry::new(&test_groups())
}

pub fn test_config() -> AnalysisConfig {
    AnalysisConfig::default().with_groups(test_groups())
}

pub fn downtime_row(machine: &str, stop: &str, start: &str, end: &str) -> DowntimeSourceRow {
    DowntimeSourceRow {
        machine_id: machine.to_string(),
        stop_name: stop.to_string(),
        started_at: start.to_string(),
        ended_at: end.to_string(),
    }
}

pub fn utilization_row(
    machine: &str,
    date: &str,
    total: f64,
    planned: f64,
    unplanned: f64,
) -> UtilizationSourceRow {
    UtilizationSourceRow {
        machine_id: machine.to_string(),
        date: date.to_string(),
        total_time: Some(total),
        planned_stop: Some(planned),
        unplanned_stop: Some(unplanned),
        metrics: OeeMetrics {
            oee: Some(0.6),
            performance: Some(0.8),
            availability: Some(0.75),
            quality: Some(1.0),
        },
    }
}

/// A downtime row already in the shared layout
pub fn normalized_stop(machine: &str, stop: &str, start: &str, seconds: i64) -> NormalizedRow {
    NormalizedRow {
        machine_id: machine.to_string(),
        stop_name: stop.to_string(),
        started_at: start.to_string(),
        duration_seconds: Some(seconds),
        duration_minutes: Some(seconds / 60),
        metrics: OeeMetrics::default(),
    }
}
