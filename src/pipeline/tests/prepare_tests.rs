//! Tests for the assembled preparation flow

use super::*;
use crate::models::{FaultList, WeekStamp};
use crate::pipeline::prepare_rows;
use std::collections::BTreeMap;

fn sample_downtime() -> Vec<DowntimeSourceRow> {
    vec![
        downtime_row("M1", "TOOL CHANGE", "2024-03-04 08:00:00", "2024-03-04 08:10:00"),
        downtime_row("M2", "YEMEK MOLASI", "2024-03-04 12:00:00", "2024-03-04 12:30:00"),
        downtime_row("M4", "AYAR", "2024-03-11 08:00:00", "2024-03-11 09:00:00"),
        downtime_row("M3", "TOOL CHANGE", "2024-03-11 10:00:00", "2024-03-11 09:00:00"),
        downtime_row("TOPLAM", "", "", ""),
    ]
}

fn sample_utilization() -> Vec<UtilizationSourceRow> {
    vec![
        utilization_row("M1", "2024-03-04", 480.0, 30.0, 10.0),
        utilization_row("M2", "2024-03-04", 480.0, 30.0, 30.0),
        utilization_row("M4", "2024-03-11", 480.0, 0.0, 60.0),
        utilization_row("M3", "2024-03-12", 480.0, 0.0, 0.0),
    ]
}

#[test]
fn test_prepare_rows_accounts_for_every_row() {
    let config = test_config();
    let faults = FaultList::new();

    let prepared = prepare_rows(&config, sample_downtime(), sample_utilization(), &faults);
    let stats = &prepared.stats;

    assert_eq!(stats.downtime_rows_read, 5);
    assert_eq!(stats.utilization_rows_read, 4);
    assert_eq!(stats.downtime_trailing_stripped, 1);
    assert_eq!(stats.invalid_intervals, 1);
    assert_eq!(stats.outside_coverage, 1);
    assert_eq!(stats.fact_rows, 6);
    assert_eq!(prepared.facts.len(), 6);
    assert_eq!(
        stats.downtime_rows_read + stats.utilization_rows_read - stats.rows_dropped(),
        stats.fact_rows
    );

    assert_eq!(
        prepared.weeks.as_slice(),
        &[WeekStamp::iso(2024, 11), WeekStamp::iso(2024, 10)]
    );
    assert_eq!(prepared.weeks.current(), Some(WeekStamp::iso(2024, 11)));
}

#[test]
fn test_prepare_rows_applies_fault_list_everywhere() {
    let config = test_config();
    let faults: FaultList = ["M2"].into_iter().collect();

    let prepared = prepare_rows(&config, sample_downtime(), sample_utilization(), &faults);

    assert_eq!(prepared.stats.fault_filtered, 2);
    assert!(
        prepared
            .facts
            .records()
            .iter()
            .all(|record| record.machine_id != "M2")
    );
    assert_eq!(prepared.group_counts.get("LINE A"), Some(2));
    assert_eq!(prepared.group_counts.get("LINE B"), Some(1));
}

#[test]
fn test_merged_minutes_match_sources_per_machine() {
    let config = test_config();
    let faults: FaultList = ["M2"].into_iter().collect();

    let prepared = prepare_rows(&config, sample_downtime(), sample_utilization(), &faults);

    let mut merged: BTreeMap<String, i64> = BTreeMap::new();
    for record in prepared.facts.records() {
        *merged.entry(record.machine_id.clone()).or_default() += record.duration_minutes;
    }

    // M1: 10 min stop + (480 - 30 - 10) uptime; M4: 60 min stop + 420 uptime.
    // M3 has no valid interval and its utilization day is outside coverage.
    let mut expected = BTreeMap::new();
    expected.insert("M1".to_string(), 10 + 440);
    expected.insert("M4".to_string(), 60 + 420);
    assert_eq!(merged, expected);
}

#[test]
fn test_undated_utilization_rows_are_counted_as_unparseable() {
    let config = test_config();
    let downtime = vec![downtime_row(
        "M1",
        "TOOL CHANGE",
        "2024-03-04 08:00:00",
        "2024-03-04 08:10:00",
    )];
    let utilization = vec![
        utilization_row("M1", "2024-03-04", 480.0, 30.0, 10.0),
        utilization_row("M1", "???", 480.0, 30.0, 10.0),
    ];

    let prepared = prepare_rows(&config, downtime, utilization, &FaultList::new());
    let stats = &prepared.stats;

    assert_eq!(stats.outside_coverage, 0);
    assert_eq!(stats.unparseable_dropped, 1);
    assert!(!stats.sentinel_applied);
    assert_eq!(stats.fact_rows, 2);
    assert_eq!(
        stats.downtime_rows_read + stats.utilization_rows_read - stats.rows_dropped(),
        stats.fact_rows
    );
    assert_eq!(prepared.weeks.as_slice(), &[WeekStamp::iso(2024, 10)]);
}

#[test]
fn test_unresolved_week_when_no_timestamp_parses() {
    let config = test_config();
    let downtime = vec![downtime_row("M1", "TOOL CHANGE", "garbage", "garbage")];
    let utilization = vec![utilization_row("M1", "not-a-date", 480.0, 30.0, 10.0)];

    let prepared = prepare_rows(&config, downtime, utilization, &FaultList::new());
    let stats = &prepared.stats;

    assert_eq!(stats.invalid_intervals, 1);
    assert_eq!(stats.outside_coverage, 0);
    assert_eq!(stats.unparseable_dropped, 0);
    assert!(stats.sentinel_applied);
    assert_eq!(stats.fact_rows, 1);

    let record = &prepared.facts.records()[0];
    assert_eq!(record.week, WeekStamp::Unresolved);
    assert_eq!(record.started_at, None);
    assert_eq!(record.duration_minutes, 440);
    assert_eq!(prepared.weeks.current(), Some(WeekStamp::Unresolved));
}
