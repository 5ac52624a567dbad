//! Chart-ready views over the aggregation tables.

use crate::aggregation::{CauseTotal, MachineTotal};
use crate::constants::OTHER_SLICE;
use serde::Serialize;

/// One pie slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub minutes: i64,
    pub share_pct: f64,
}

/// Merge causes below `threshold_pct` of the total into one `OTHER` slice
///
/// The merged slice is only added when its minutes are positive. A table
/// whose minutes sum to zero yields no slices.
pub fn collapse_minor_slices(totals: &[CauseTotal], threshold_pct: f64) -> Vec<Slice> {
    let total: i64 = totals.iter().map(|entry| entry.minutes).sum();
    if total == 0 {
        return Vec::new();
    }
    let share = |minutes: i64| minutes as f64 / total as f64 * 100.0;

    let mut slices = Vec::new();
    let mut other = 0;
    for entry in totals {
        let share_pct = share(entry.minutes);
        if share_pct < threshold_pct {
            other += entry.minutes;
        } else {
            slices.push(Slice {
                label: entry.cause.clone(),
                minutes: entry.minutes,
                share_pct,
            });
        }
    }

    if other > 0 {
        slices.push(Slice {
            label: OTHER_SLICE.to_string(),
            minutes: other,
            share_pct: share(other),
        });
    }
    slices
}

/// Views over the ascending machine totals
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MachineRankings {
    /// Tail of the table: the machines with the most downtime
    pub highest: Vec<MachineTotal>,
    /// Head of the table
    pub lowest: Vec<MachineTotal>,
    /// Everything between head and tail
    pub middle: Vec<MachineTotal>,
}

/// Split ascending machine totals into lowest, middle and highest `n`
pub fn rank_machines(totals: &[MachineTotal], n: usize) -> MachineRankings {
    let len = totals.len();
    let lowest = totals[..n.min(len)].to_vec();
    let highest = totals[len.saturating_sub(n)..].to_vec();
    let middle = if len > 2 * n {
        totals[n..len - n].to_vec()
    } else {
        Vec::new()
    };

    MachineRankings {
        highest,
        lowest,
        middle,
    }
}

/// Least and most affected machines, leaving out those without a positive share
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopBottom {
    pub bottom: Vec<MachineTotal>,
    pub top: Vec<MachineTotal>,
}

pub fn top_bottom(totals: &[MachineTotal], top: usize, bottom: usize) -> TopBottom {
    let total: i64 = totals.iter().map(|entry| entry.minutes).sum();
    if total == 0 {
        return TopBottom::default();
    }

    let positive: Vec<&MachineTotal> = totals
        .iter()
        .filter(|entry| entry.minutes as f64 / total as f64 > 0.0)
        .collect();

    TopBottom {
        bottom: positive.iter().take(bottom).map(|entry| (*entry).clone()).collect(),
        top: positive[positive.len().saturating_sub(top)..]
            .iter()
            .map(|entry| (*entry).clone())
            .collect(),
    }
}
