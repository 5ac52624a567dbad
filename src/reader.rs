//! Source table loading.
//!
//! Reads the downtime event export and the daily utilization export with
//! polars, validates the required columns, and converts the frames into
//! typed source rows. Every column is read as text so that a malformed
//! cell never aborts the load; cells are interpreted afterwards.

use crate::config::{AnalysisConfig, DowntimeColumns, UtilizationColumns};
use crate::error::{DowntimeError, Result};
use crate::models::{DowntimeSourceRow, FaultList, OeeMetrics, UtilizationSourceRow};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read a delimited export into a string-typed DataFrame
pub fn read_table(path: &Path, separator: u8) -> Result<DataFrame> {
    if !path.exists() {
        return Err(DowntimeError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_truncate_ragged_lines(true),
        )
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(
        "Read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Fail with a schema error naming the first missing column
pub fn require_columns(df: &DataFrame, path: &Path, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.get_column_index(column).is_none() {
            return Err(DowntimeError::Schema {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Load the downtime event export
pub fn read_downtime_table(path: &Path, config: &AnalysisConfig) -> Result<Vec<DowntimeSourceRow>> {
    info!("Loading downtime events: {}", path.display());
    let df = read_table(path, config.separator_byte())?;
    let columns = &config.downtime_columns;
    require_columns(&df, path, &columns.required())?;

    let rows = downtime_rows(&df, columns)?;
    info!("Downtime events loaded: {} rows", rows.len());
    Ok(rows)
}

/// Load the daily utilization export
pub fn read_utilization_table(
    path: &Path,
    config: &AnalysisConfig,
) -> Result<Vec<UtilizationSourceRow>> {
    info!("Loading utilization metrics: {}", path.display());
    let df = read_table(path, config.separator_byte())?;
    let columns = &config.utilization_columns;
    require_columns(&df, path, &columns.required())?;

    let rows = utilization_rows(&df, columns)?;
    info!("Utilization metrics loaded: {} rows", rows.len());
    Ok(rows)
}

/// Load the fault-flagged machine list
///
/// Fault tracking is optional: a missing or empty file yields an empty list.
pub fn read_fault_list(path: Option<&Path>) -> FaultList {
    let Some(path) = path else {
        return FaultList::new();
    };

    match std::fs::read_to_string(path) {
        Ok(text) => {
            let faults: FaultList = text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect();
            if faults.is_empty() {
                warn!("Fault list is empty: {}", path.display());
            } else {
                info!(
                    "Fault list loaded: {} machines from {}",
                    faults.len(),
                    path.display()
                );
            }
            faults
        }
        Err(e) => {
            warn!(
                "Fault list not available ({}): {}, continuing without exclusions",
                path.display(),
                e
            );
            FaultList::new()
        }
    }
}

fn downtime_rows(df: &DataFrame, columns: &DowntimeColumns) -> Result<Vec<DowntimeSourceRow>> {
    let machines = text_cells(df, &columns.machine_id)?;
    let stop_names = text_cells(df, &columns.stop_name)?;
    let starts = text_cells(df, &columns.started_at)?;
    let ends = text_cells(df, &columns.ended_at)?;

    let rows = (0..df.height())
        .map(|i| DowntimeSourceRow {
            machine_id: machines[i].clone(),
            stop_name: stop_names[i].clone(),
            started_at: starts[i].clone(),
            ended_at: ends[i].clone(),
        })
        .collect();
    Ok(rows)
}

fn utilization_rows(
    df: &DataFrame,
    columns: &UtilizationColumns,
) -> Result<Vec<UtilizationSourceRow>> {
    let machines = text_cells(df, &columns.machine_id)?;
    let dates = text_cells(df, &columns.date)?;
    let total_time = numeric_cells(df, &columns.total_time)?;
    let planned = numeric_cells(df, &columns.planned_stop)?;
    let unplanned = numeric_cells(df, &columns.unplanned_stop)?;
    let oee = numeric_cells(df, &columns.oee)?;
    let performance = numeric_cells(df, &columns.performance)?;
    let availability = numeric_cells(df, &columns.availability)?;
    let quality = numeric_cells(df, &columns.quality)?;

    let rows = (0..df.height())
        .map(|i| UtilizationSourceRow {
            machine_id: machines[i].clone(),
            date: dates[i].clone(),
            total_time: total_time[i],
            planned_stop: planned[i],
            unplanned_stop: unplanned[i],
            metrics: OeeMetrics {
                oee: oee[i],
                performance: performance[i],
                availability: availability[i],
                quality: quality[i],
            },
        })
        .collect();
    Ok(rows)
}

/// Column cells as trimmed text; nulls become empty strings
///
/// Trimmed the same way as fault list lines so machine codes compare equal.
fn text_cells(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let series = string_series(df, name)?;
    let values = series
        .str()?
        .into_iter()
        .map(|cell| cell.map(|v| v.trim().to_string()).unwrap_or_default())
        .collect();
    Ok(values)
}

fn numeric_cells(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = string_series(df, name)?;
    let values = series.str()?.into_iter().map(parse_number).collect();
    Ok(values)
}

fn string_series(df: &DataFrame, name: &str) -> Result<Series> {
    Ok(df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?)
}

/// Parse a spreadsheet number, accepting `,` as the decimal separator
pub fn parse_number(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    let value = text
        .parse::<f64>()
        .ok()
        .or_else(|| text.replace(',', ".").parse::<f64>().ok())?;
    value.is_finite().then_some(value)
}
