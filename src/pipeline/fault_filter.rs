//! Removal of fault-flagged machines.

use crate::models::{FaultList, MachineKeyed};
use tracing::debug;

/// Drop every row whose machine is on the fault list
pub fn exclude<R: MachineKeyed>(rows: Vec<R>, fault_list: &FaultList) -> Vec<R> {
    if fault_list.is_empty() {
        return rows;
    }

    let before = rows.len();
    let kept: Vec<R> = rows
        .into_iter()
        .filter(|row| !fault_list.contains(row.machine_id()))
        .collect();

    debug!(
        "Fault filter removed {} of {} rows",
        before - kept.len(),
        before
    );
    kept
}
