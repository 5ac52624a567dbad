//! Report assembly.
//!
//! Computes every table the reporting layer consumes from the prepared
//! data, for the current analysis week and across the week history, and
//! writes them out as CSV.

pub mod slices;
pub mod writer;

use crate::aggregation::{
    self, CauseBuckets, CauseTotal, GroupAverage, GroupTotal, MachineCauseTotal,
    MachineStopBreakdown, MachineTotal, OeeRollup, TrendEntity, TrendRow,
};
use crate::config::AnalysisConfig;
use crate::constants::TOP_BOTTOM_SIZE;
use crate::error::Result;
use crate::models::{StopRecord, WeekStamp};
use crate::pipeline::PreparedData;
use tracing::{debug, info};

pub use slices::{MachineRankings, Slice, TopBottom};
pub use writer::write_report;

/// Cause mix of one representative machine of a group
#[derive(Debug, Clone, PartialEq)]
pub struct PartAverage {
    pub group: String,
    pub causes: Vec<CauseTotal>,
}

/// All tables of one report run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTables {
    /// Current analysis week; `None` when the fact table is empty
    pub week: Option<WeekStamp>,
    pub latest_week: Vec<StopRecord>,
    pub cause_totals: Vec<CauseTotal>,
    pub cause_pie: Vec<Slice>,
    pub group_totals: Vec<GroupTotal>,
    pub group_averages: Vec<GroupAverage>,
    pub machine_totals: Vec<MachineTotal>,
    pub rankings: MachineRankings,
    pub top_bottom: TopBottom,
    pub machine_causes: Vec<MachineCauseTotal>,
    pub machine_breakdown: Vec<MachineStopBreakdown>,
    pub group_trend: Vec<TrendRow>,
    pub machine_trend: Vec<TrendRow>,
    pub part_averages: Vec<PartAverage>,
    pub oee: OeeRollup,
}

/// Compute every report table from the prepared data
pub fn build_report(prepared: &PreparedData, config: &AnalysisConfig) -> Result<ReportTables> {
    let full = CauseBuckets::compile(&config.cause_rules.full)?;
    let trend = CauseBuckets::compile(&config.cause_rules.trend)?;

    let Some(week) = prepared.weeks.current() else {
        info!("Fact table is empty, no report tables to build");
        return Ok(ReportTables::default());
    };
    if !week.is_resolved() {
        info!("Current analysis week is unresolved; tables cover every row");
    }

    let history = prepared.facts.records();
    let latest_week = prepared.facts.for_week(week);
    debug!("Current week {}: {} rows", week, latest_week.len());

    let cause_totals = aggregation::total_by_cause(&latest_week, &full);
    let cause_pie = slices::collapse_minor_slices(&cause_totals, config.pie_threshold_pct);
    let machine_totals = aggregation::per_machine_total(&latest_week);
    let rankings = slices::rank_machines(&machine_totals, config.ranking_size);
    let top_bottom = slices::top_bottom(&machine_totals, TOP_BOTTOM_SIZE, TOP_BOTTOM_SIZE);

    let part_averages = prepared
        .group_counts
        .groups()
        .map(|group| PartAverage {
            group: group.to_string(),
            causes: aggregation::part_average_stop_times(
                &latest_week,
                group,
                &prepared.group_counts,
                &full,
            ),
        })
        .filter(|part| !part.causes.is_empty())
        .collect();

    let tables = ReportTables {
        week: Some(week),
        cause_pie,
        group_totals: aggregation::total_by_group(&latest_week),
        group_averages: aggregation::per_machine_group_average(
            &latest_week,
            &prepared.group_counts,
        ),
        rankings,
        top_bottom,
        machine_causes: aggregation::per_machine_per_cause(&latest_week, &full),
        machine_breakdown: aggregation::machine_stop_breakdown(&latest_week),
        group_trend: aggregation::top_n_trend(
            history,
            week,
            TrendEntity::Group,
            config.top_n,
            &trend,
        ),
        machine_trend: aggregation::top_n_trend(
            history,
            week,
            TrendEntity::Machine,
            config.top_n,
            &trend,
        ),
        part_averages,
        oee: aggregation::oee_rollup(history, &prepared.weeks),
        cause_totals,
        machine_totals,
        latest_week,
    };

    info!(
        "Report tables built for week {}: {} causes, {} machines, {} OEE rows",
        week,
        tables.cause_totals.len(),
        tables.machine_totals.len(),
        tables.oee.len()
    );
    Ok(tables)
}
