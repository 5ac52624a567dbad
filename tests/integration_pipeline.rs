//! Integration tests for the report pipeline
//!
//! These tests run realistic downtime and utilization exports through
//! preparation, report assembly and CSV output using the plant's built-in
//! group table and column names.

use downtime_processor::aggregation::OeeScope;
use downtime_processor::constants::report_files;
use downtime_processor::{
    AnalysisConfig, DowntimeError, SourceInputs, WeekStamp, build_report, prepare, write_report,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DOWNTIME_CSV: &str = "İş Merkezi Kodu ,Duruş Adı,Duruş Başlangıç Tarih,Duruş Bitiş Tarih
CT.D01,YEMEK MOLASI 1,2024-03-04 08:00:00,2024-03-04 08:10:00
CT.D01,MEAL BREAK - SHIFT2,2024-03-04 12:00:00,2024-03-04 12:30:00
CT.D02,YEMEK MOLASI 2,2024-03-04 12:00:00,2024-03-04 12:10:00
CT.D02,TOOL CHANGE,2024-03-04 09:00:00,2024-03-04 09:10:00
CT.D01,TOOL CHANGE,2024-02-26 09:00:00,2024-02-26 09:20:00
CT.D03,TOOL CHANGE,2024-03-04 10:00:00,2024-03-04 09:00:00
Toplam,,,
";

const UTILIZATION_CSV: &str = "Makina Kodu,Tarih,Çalışma Zamanı,Planlı Duruş,Plansız Duruş,Oee,Performans,Kullanılabilirlik,Kalite
CT.D01,2024-03-04,40,20,15,0.6,0.8,0.75,1.0
CT.D01,2024-02-26,60,30,20,0.4,0.7,0.6,0.9
CT.D05,2024-03-04,480,0,0,0.9,0.9,0.9,0.9
";

/// Write both exports (and optionally a fault list) into a temp directory
fn write_exports(temp_dir: &TempDir, faulty: Option<&str>) -> SourceInputs {
    let downtime = temp_dir.path().join("downtime.csv");
    let utilization = temp_dir.path().join("utilization.csv");
    fs::write(&downtime, DOWNTIME_CSV).unwrap();
    fs::write(&utilization, UTILIZATION_CSV).unwrap();

    let faulty = faulty.map(|content| {
        let path = temp_dir.path().join("faulty.txt");
        fs::write(&path, content).unwrap();
        path
    });

    SourceInputs {
        downtime,
        utilization,
        faulty,
    }
}

fn read_lines(path: PathBuf) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.to_string())
        .collect()
}

#[test]
fn test_preparation_accounts_for_dropped_rows() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = write_exports(&temp_dir, None);

    let prepared = prepare(&AnalysisConfig::default(), &inputs).unwrap();

    assert_eq!(prepared.stats.downtime_rows_read, 7);
    assert_eq!(prepared.stats.downtime_trailing_stripped, 1);
    assert_eq!(prepared.stats.invalid_intervals, 1);
    assert_eq!(prepared.stats.outside_coverage, 1);
    assert_eq!(prepared.stats.fact_rows, 7);
    assert!(!prepared.stats.sentinel_applied);

    assert_eq!(
        prepared.weeks.as_slice(),
        &[WeekStamp::iso(2024, 10), WeekStamp::iso(2024, 9)]
    );
    assert!(
        prepared
            .facts
            .records()
            .iter()
            .all(|record| record.group.group_name() == Some("KISIM 2.1"))
    );
}

#[test]
fn test_current_week_tables() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = write_exports(&temp_dir, None);
    let config = AnalysisConfig::default();

    let prepared = prepare(&config, &inputs).unwrap();
    let tables = build_report(&prepared, &config).unwrap();

    assert_eq!(tables.week, Some(WeekStamp::iso(2024, 10)));
    let causes: Vec<(&str, i64)> = tables
        .cause_totals
        .iter()
        .map(|entry| (entry.cause.as_str(), entry.minutes))
        .collect();
    assert_eq!(
        causes,
        vec![("MEAL BREAK", 50), ("TOOL CHANGE", 10), ("OPERATING TIME", 5)]
    );

    assert_eq!(tables.group_totals.len(), 1);
    assert_eq!(tables.group_totals[0].group, "KISIM 2.1");
    assert_eq!(tables.group_totals[0].minutes, 60);
    assert_eq!(tables.group_averages[0].machine_count, 15);

    let machines: Vec<(&str, i64)> = tables
        .machine_totals
        .iter()
        .map(|entry| (entry.machine_id.as_str(), entry.minutes))
        .collect();
    assert_eq!(machines, vec![("CT.D02", 20), ("CT.D01", 40)]);

    assert!(
        tables
            .group_trend
            .iter()
            .any(|row| row.week == WeekStamp::iso(2024, 9) && row.cause == "TOOL CHANGE")
    );
    assert!(
        tables
            .machine_trend
            .iter()
            .all(|row| row.entity.starts_with("CT.D0"))
    );

    let overall_w9 = tables.oee.overall(WeekStamp::iso(2024, 9)).unwrap();
    assert_eq!(overall_w9.oee, Some(0.4));
    let group_w10 = tables
        .oee
        .get(WeekStamp::iso(2024, 10), OeeScope::Group, "KISIM 2.1")
        .unwrap();
    assert_eq!(group_w10.quality, Some(1.0));
}

#[test]
fn test_fault_list_reduces_eligible_machines() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = write_exports(&temp_dir, Some("CT.D02\n\n  CT.D09  \n"));
    let config = AnalysisConfig::default();

    let prepared = prepare(&config, &inputs).unwrap();
    let tables = build_report(&prepared, &config).unwrap();

    assert_eq!(prepared.stats.fault_filtered, 2);
    assert_eq!(tables.group_averages[0].machine_count, 13);
    assert!(
        tables
            .machine_totals
            .iter()
            .all(|entry| entry.machine_id != "CT.D02")
    );
}

#[test]
fn test_report_files_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = write_exports(&temp_dir, None);
    let config = AnalysisConfig::default();
    let output_dir = temp_dir.path().join("reports");

    let prepared = prepare(&config, &inputs).unwrap();
    let tables = build_report(&prepared, &config).unwrap();
    let written = write_report(&tables, &output_dir, true).unwrap();

    assert_eq!(written.len(), 16);
    let causes = read_lines(output_dir.join(report_files::CAUSE_TOTALS));
    assert_eq!(causes[0], "cause,seconds,minutes");
    assert_eq!(causes[1], "MEAL BREAK,3000,50");

    let machines = read_lines(output_dir.join(report_files::MACHINE_TOTALS));
    assert_eq!(machines.len(), 3);
    assert!(machines[1].starts_with("CT.D02,"));

    let facts = read_lines(output_dir.join(report_files::LATEST_WEEK_FACTS));
    assert_eq!(facts.len(), 6);
}

#[test]
fn test_custom_columns_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
separator = ";"

[downtime_columns]
machine_id = "Machine"
stop_name = "Stop"
started_at = "Start"
ended_at = "End"

[utilization_columns]
machine_id = "Machine"
date = "Date"
total_time = "Total"
planned_stop = "Planned"
unplanned_stop = "Unplanned"
oee = "OEE"
performance = "Performance"
availability = "Availability"
quality = "Quality"

[[groups]]
name = "PRESS"
machines = ["P1", "P2"]
"#,
    )
    .unwrap();

    let downtime = temp_dir.path().join("downtime.csv");
    fs::write(
        &downtime,
        "Machine;Stop;Start;End\nP1;SMED KALIP;2024-03-04 08:00:00;2024-03-04 08:15:00\n",
    )
    .unwrap();
    let utilization = temp_dir.path().join("utilization.csv");
    fs::write(
        &utilization,
        "Machine;Date;Total;Planned;Unplanned;OEE;Performance;Availability;Quality\n\
P1;2024-03-04;480;30,5;12;0,71;0,8;;0,99\n",
    )
    .unwrap();

    let config = AnalysisConfig::load(Some(&config_path)).unwrap();
    let inputs = SourceInputs {
        downtime,
        utilization,
        faulty: None,
    };
    let prepared = prepare(&config, &inputs).unwrap();
    let tables = build_report(&prepared, &config).unwrap();

    assert_eq!(prepared.stats.fact_rows, 2);
    assert_eq!(tables.cause_totals[0].cause, "OPERATING TIME");
    assert_eq!(tables.cause_totals[0].minutes, 437);
    assert_eq!(tables.cause_totals[1].cause, "SETUP");
    assert_eq!(tables.group_averages[0].machine_count, 2);
}

#[test]
fn test_missing_column_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = write_exports(&temp_dir, None);
    fs::write(
        &inputs.utilization,
        "Makina Kodu,Tarih,Çalışma Zamanı\nCT.D01,2024-03-04,40\n",
    )
    .unwrap();

    match prepare(&AnalysisConfig::default(), &inputs) {
        Err(DowntimeError::Schema { column, .. }) => assert_eq!(column, "Planlı Duruş"),
        other => panic!("Expected schema error, got {:?}", other.map(|p| p.stats)),
    }
}

#[test]
fn test_unreadable_dates_fall_back_to_unresolved_week() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = write_exports(&temp_dir, None);
    fs::write(
        &inputs.downtime,
        "İş Merkezi Kodu ,Duruş Adı,Duruş Başlangıç Tarih,Duruş Bitiş Tarih\n\
CT.D01,TOOL CHANGE,garbage,garbage\n",
    )
    .unwrap();
    fs::write(
        &inputs.utilization,
        "Makina Kodu,Tarih,Çalışma Zamanı,Planlı Duruş,Plansız Duruş,Oee,Performans,Kullanılabilirlik,Kalite\n\
CT.D01,not-a-date,40,20,15,0.6,0.8,0.75,1.0\n\
CT.D02,??,60,30,20,0.4,0.7,0.6,0.9\n",
    )
    .unwrap();
    let config = AnalysisConfig::default();

    let prepared = prepare(&config, &inputs).unwrap();
    assert!(prepared.stats.sentinel_applied);
    assert_eq!(prepared.stats.invalid_intervals, 1);
    assert_eq!(prepared.stats.fact_rows, 2);

    let tables = build_report(&prepared, &config).unwrap();
    assert_eq!(tables.week, Some(WeekStamp::Unresolved));
    assert_eq!(tables.latest_week.len(), 2);
    assert_eq!(tables.cause_totals.len(), 1);
    assert_eq!(tables.cause_totals[0].cause, "OPERATING TIME");
    assert_eq!(tables.cause_totals[0].minutes, 15);
}
