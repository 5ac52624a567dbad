//! CSV writing for report tables
//!
//! Each table becomes one polars DataFrame written with `CsvWriter` into the
//! output directory.

use crate::aggregation::{CauseTotal, MachineTotal, OeeScope, TrendRow};
use crate::constants::report_files;
use crate::error::{DowntimeError, Result};
use crate::models::StopRecord;
use crate::report::{ReportTables, Slice};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes report tables into one directory
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
    export_latest_week: bool,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            export_latest_week: false,
        }
    }

    /// Also write the current week's fact rows
    pub fn with_latest_week_export(mut self, enabled: bool) -> Self {
        self.export_latest_week = enabled;
        self
    }

    /// Write every table, returning the paths written
    pub fn write(&self, tables: &ReportTables) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;
        let mut written = Vec::new();

        let mut frames = vec![
            (
                report_files::CAUSE_TOTALS,
                cause_frame(&tables.cause_totals)?,
            ),
            (
                report_files::CAUSE_TOTALS_PIE,
                slice_frame(&tables.cause_pie)?,
            ),
            (report_files::GROUP_TOTALS, group_total_frame(tables)?),
            (report_files::GROUP_AVERAGES, group_average_frame(tables)?),
            (
                report_files::MACHINE_TOTALS,
                machine_frame(&tables.machine_totals)?,
            ),
            (
                report_files::MACHINES_HIGHEST,
                machine_frame(&tables.rankings.highest)?,
            ),
            (
                report_files::MACHINES_LOWEST,
                machine_frame(&tables.rankings.lowest)?,
            ),
            (
                report_files::MACHINES_MIDDLE,
                machine_frame(&tables.rankings.middle)?,
            ),
            (report_files::MACHINES_TOP_BOTTOM, top_bottom_frame(tables)?),
            (report_files::MACHINE_CAUSES, machine_cause_frame(tables)?),
            (report_files::MACHINE_BREAKDOWN, breakdown_frame(tables)?),
            (report_files::GROUP_TREND, trend_frame(&tables.group_trend)?),
            (
                report_files::MACHINE_TREND,
                trend_frame(&tables.machine_trend)?,
            ),
            (report_files::PART_AVERAGES, part_average_frame(tables)?),
            (report_files::OEE_ROLLUP, oee_frame(tables)?),
        ];
        if self.export_latest_week {
            frames.push((
                report_files::LATEST_WEEK_FACTS,
                fact_frame(&tables.latest_week)?,
            ));
        }

        for (name, mut df) in frames {
            let path = self.output_dir.join(name);
            write_csv(&mut df, &path)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Write every table into `dir`
pub fn write_report(
    tables: &ReportTables,
    dir: &Path,
    export_latest_week: bool,
) -> Result<Vec<PathBuf>> {
    ReportWriter::new(dir.to_path_buf())
        .with_latest_week_export(export_latest_week)
        .write(tables)
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(df)
        .map_err(|e| DowntimeError::Processing {
            reason: format!("Failed to write {}: {}", path.display(), e),
        })?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

fn cause_frame(totals: &[CauseTotal]) -> Result<DataFrame> {
    Ok(df!(
        "cause" => totals.iter().map(|t| t.cause.as_str()).collect::<Vec<_>>(),
        "seconds" => totals.iter().map(|t| t.seconds).collect::<Vec<_>>(),
        "minutes" => totals.iter().map(|t| t.minutes).collect::<Vec<_>>()
    )?)
}

fn slice_frame(slices: &[Slice]) -> Result<DataFrame> {
    Ok(df!(
        "label" => slices.iter().map(|s| s.label.as_str()).collect::<Vec<_>>(),
        "minutes" => slices.iter().map(|s| s.minutes).collect::<Vec<_>>(),
        "share_pct" => slices.iter().map(|s| s.share_pct).collect::<Vec<_>>()
    )?)
}

fn group_total_frame(tables: &ReportTables) -> Result<DataFrame> {
    let totals = &tables.group_totals;
    Ok(df!(
        "group" => totals.iter().map(|t| t.group.as_str()).collect::<Vec<_>>(),
        "seconds" => totals.iter().map(|t| t.seconds).collect::<Vec<_>>(),
        "minutes" => totals.iter().map(|t| t.minutes).collect::<Vec<_>>()
    )?)
}

fn group_average_frame(tables: &ReportTables) -> Result<DataFrame> {
    let averages = &tables.group_averages;
    Ok(df!(
        "group" => averages.iter().map(|a| a.group.as_str()).collect::<Vec<_>>(),
        "machine_count" => averages.iter().map(|a| a.machine_count as u64).collect::<Vec<_>>(),
        "total_seconds" => averages.iter().map(|a| a.total_seconds).collect::<Vec<_>>(),
        "average_seconds" => averages.iter().map(|a| a.average_seconds).collect::<Vec<_>>(),
        "average_minutes" => averages.iter().map(|a| a.average_minutes).collect::<Vec<_>>()
    )?)
}

fn machine_frame(totals: &[MachineTotal]) -> Result<DataFrame> {
    Ok(df!(
        "machine_id" => totals.iter().map(|t| t.machine_id.as_str()).collect::<Vec<_>>(),
        "group" => totals.iter().map(|t| t.group.as_str()).collect::<Vec<_>>(),
        "seconds" => totals.iter().map(|t| t.seconds).collect::<Vec<_>>(),
        "minutes" => totals.iter().map(|t| t.minutes).collect::<Vec<_>>()
    )?)
}

fn top_bottom_frame(tables: &ReportTables) -> Result<DataFrame> {
    let view = &tables.top_bottom;
    let entries: Vec<(&str, &MachineTotal)> = view
        .bottom
        .iter()
        .map(|m| ("bottom", m))
        .chain(view.top.iter().map(|m| ("top", m)))
        .collect();
    Ok(df!(
        "side" => entries.iter().map(|(side, _)| *side).collect::<Vec<_>>(),
        "machine_id" => entries.iter().map(|(_, m)| m.machine_id.as_str()).collect::<Vec<_>>(),
        "minutes" => entries.iter().map(|(_, m)| m.minutes).collect::<Vec<_>>()
    )?)
}

fn machine_cause_frame(tables: &ReportTables) -> Result<DataFrame> {
    let totals = &tables.machine_causes;
    Ok(df!(
        "machine_id" => totals.iter().map(|t| t.machine_id.as_str()).collect::<Vec<_>>(),
        "cause" => totals.iter().map(|t| t.cause.as_str()).collect::<Vec<_>>(),
        "seconds" => totals.iter().map(|t| t.seconds).collect::<Vec<_>>(),
        "minutes" => totals.iter().map(|t| t.minutes).collect::<Vec<_>>()
    )?)
}

fn breakdown_frame(tables: &ReportTables) -> Result<DataFrame> {
    let entries = &tables.machine_breakdown;
    Ok(df!(
        "machine_id" => entries.iter().map(|e| e.machine_id.as_str()).collect::<Vec<_>>(),
        "stop_name" => entries.iter().map(|e| e.stop_name.as_str()).collect::<Vec<_>>(),
        "minutes" => entries.iter().map(|e| e.minutes).collect::<Vec<_>>()
    )?)
}

fn trend_frame(rows: &[TrendRow]) -> Result<DataFrame> {
    Ok(df!(
        "entity" => rows.iter().map(|r| r.entity.as_str()).collect::<Vec<_>>(),
        "week" => rows.iter().map(|r| r.week.to_string()).collect::<Vec<_>>(),
        "cause" => rows.iter().map(|r| r.cause.as_str()).collect::<Vec<_>>(),
        "seconds" => rows.iter().map(|r| r.seconds).collect::<Vec<_>>(),
        "minutes" => rows.iter().map(|r| r.minutes).collect::<Vec<_>>()
    )?)
}

fn part_average_frame(tables: &ReportTables) -> Result<DataFrame> {
    let entries: Vec<(&str, &CauseTotal)> = tables
        .part_averages
        .iter()
        .flat_map(|part| part.causes.iter().map(|cause| (part.group.as_str(), cause)))
        .collect();
    Ok(df!(
        "group" => entries.iter().map(|(group, _)| *group).collect::<Vec<_>>(),
        "cause" => entries.iter().map(|(_, c)| c.cause.as_str()).collect::<Vec<_>>(),
        "seconds" => entries.iter().map(|(_, c)| c.seconds).collect::<Vec<_>>(),
        "minutes" => entries.iter().map(|(_, c)| c.minutes).collect::<Vec<_>>()
    )?)
}

fn scope_label(scope: OeeScope) -> &'static str {
    match scope {
        OeeScope::Overall => "overall",
        OeeScope::Group => "group",
        OeeScope::Machine => "machine",
    }
}

fn oee_frame(tables: &ReportTables) -> Result<DataFrame> {
    let rows = tables.oee.rows();
    Ok(df!(
        "week" => rows.iter().map(|r| r.week.to_string()).collect::<Vec<_>>(),
        "scope" => rows.iter().map(|r| scope_label(r.scope)).collect::<Vec<_>>(),
        "entity" => rows.iter().map(|r| r.entity.as_str()).collect::<Vec<_>>(),
        "oee" => rows.iter().map(|r| r.metrics.oee).collect::<Vec<_>>(),
        "performance" => rows.iter().map(|r| r.metrics.performance).collect::<Vec<_>>(),
        "availability" => rows.iter().map(|r| r.metrics.availability).collect::<Vec<_>>(),
        "quality" => rows.iter().map(|r| r.metrics.quality).collect::<Vec<_>>()
    )?)
}

fn fact_frame(records: &[StopRecord]) -> Result<DataFrame> {
    Ok(df!(
        "machine_id" => records.iter().map(|r| r.machine_id.as_str()).collect::<Vec<_>>(),
        "stop_name" => records.iter().map(|r| r.stop_name.as_str()).collect::<Vec<_>>(),
        "started_at" => records
            .iter()
            .map(|r| r.started_at.map(|date| date.to_string()))
            .collect::<Vec<_>>(),
        "duration_seconds" => records.iter().map(|r| r.duration_seconds).collect::<Vec<_>>(),
        "duration_minutes" => records.iter().map(|r| r.duration_minutes).collect::<Vec<_>>(),
        "group" => records.iter().map(|r| r.group.name()).collect::<Vec<_>>(),
        "year" => records.iter().map(|r| r.week.iso_year()).collect::<Vec<_>>(),
        "week" => records.iter().map(|r| r.week.week_number()).collect::<Vec<_>>(),
        "oee" => records.iter().map(|r| r.metrics.oee).collect::<Vec<_>>(),
        "performance" => records.iter().map(|r| r.metrics.performance).collect::<Vec<_>>(),
        "availability" => records.iter().map(|r| r.metrics.availability).collect::<Vec<_>>(),
        "quality" => records.iter().map(|r| r.metrics.quality).collect::<Vec<_>>()
    )?)
}
