//! Tests for the aggregation engine

pub mod trend_tests;

use crate::aggregation::CauseBuckets;
use crate::config::CauseRuleSet;
use crate::constants::OPERATING_TIME;
use crate::models::{GroupAssignment, OeeMetrics, StopRecord, WeekStamp};

pub const WEEK_10: WeekStamp = WeekStamp::Iso {
    year: 2024,
    week: 10,
};
pub const WEEK_11: WeekStamp = WeekStamp::Iso {
    year: 2024,
    week: 11,
};

/// Group of the test machines: M1..M3 in LINE A, M4 in LINE B
pub fn group_of(machine: &str) -> GroupAssignment {
    match machine {
        "M1" | "M2" | "M3" => GroupAssignment::Group("LINE A".to_string()),
        "M4" => GroupAssignment::Group("LINE B".to_string()),
        _ => GroupAssignment::Unassigned,
    }
}

pub fn stop(machine: &str, cause: &str, seconds: i64, week: WeekStamp) -> StopRecord {
    StopRecord {
        machine_id: machine.to_string(),
        stop_name: cause.to_string(),
        started_at: None,
        duration_seconds: seconds,
        duration_minutes: seconds / 60,
        group: group_of(machine),
        week,
        metrics: OeeMetrics::default(),
    }
}

pub fn operating(machine: &str, minutes: i64, week: WeekStamp, metrics: OeeMetrics) -> StopRecord {
    StopRecord {
        machine_id: machine.to_string(),
        stop_name: OPERATING_TIME.to_string(),
        started_at: None,
        duration_seconds: minutes * 60,
        duration_minutes: minutes,
        group: group_of(machine),
        week,
        metrics,
    }
}

pub fn full_buckets() -> CauseBuckets {
    CauseBuckets::compile(&CauseRuleSet::default().full).unwrap()
}

pub fn trend_buckets() -> CauseBuckets {
    CauseBuckets::compile(&CauseRuleSet::default().trend).unwrap()
}
