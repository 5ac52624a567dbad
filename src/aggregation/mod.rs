//! Aggregation engine.
//!
//! Pure rollups over the fact table. Every function borrows the rows and
//! returns a new table; nothing here mutates or re-reads the facts. Callers
//! pre-filter to a single week where a report needs it.

pub mod buckets;
pub mod oee;
pub mod totals;
pub mod trend;

#[cfg(test)]
pub mod tests;

pub use buckets::CauseBuckets;
pub use oee::{OeeRollup, OeeRow, OeeScope, oee_rollup};
pub use totals::{
    CauseTotal, GroupAverage, GroupTotal, MachineCauseTotal, MachineStopBreakdown, MachineTotal,
    machine_stop_breakdown, part_average_stop_times, per_machine_group_average,
    per_machine_per_cause, per_machine_total, total_by_cause, total_by_group,
};
pub use trend::{TrendEntity, TrendRow, top_n_trend};
