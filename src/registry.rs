//! Machine group registry
//!
//! Static mapping from machine identifier to organizational group. Built
//! once from the configuration and never mutated.

use crate::config::GroupDefinition;
use crate::models::{FaultList, GroupAssignment, GroupMachineCounts};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Group membership lookups over the configured group table
#[derive(Debug, Clone)]
pub struct GroupRegistry {
    groups: Vec<GroupDefinition>,
    /// Machine id to index into `groups`; first definition wins
    index: HashMap<String, usize>,
}

impl GroupRegistry {
    pub fn new(groups: &[GroupDefinition]) -> Self {
        let mut index = HashMap::new();
        for (position, group) in groups.iter().enumerate() {
            for machine in &group.machines {
                index.entry(machine.clone()).or_insert(position);
            }
        }

        debug!(
            "Group registry built: {} groups, {} machines",
            groups.len(),
            index.len()
        );

        Self {
            groups: groups.to_vec(),
            index,
        }
    }

    /// Group of a machine; machines outside the tracked fleet are `Unassigned`
    pub fn resolve(&self, machine_id: &str) -> GroupAssignment {
        match self.index.get(machine_id) {
            Some(position) => GroupAssignment::Group(self.groups[*position].name.clone()),
            None => GroupAssignment::Unassigned,
        }
    }

    /// Whether the id appears in any group's raw machine list
    pub fn is_registered(&self, machine_id: &str) -> bool {
        self.index.contains_key(machine_id)
    }

    /// Machines of a group that are not fault-flagged
    pub fn eligible_count(&self, group_name: &str, fault_list: &FaultList) -> usize {
        self.groups
            .iter()
            .find(|group| group.name == group_name)
            .map(|group| {
                group
                    .machines
                    .iter()
                    .filter(|machine| !fault_list.contains(machine))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Eligible machine count for every registered group
    pub fn eligible_counts(&self, fault_list: &FaultList) -> GroupMachineCounts {
        let counts: BTreeMap<String, usize> = self
            .groups
            .iter()
            .map(|group| {
                (
                    group.name.clone(),
                    self.eligible_count(&group.name, fault_list),
                )
            })
            .collect();
        GroupMachineCounts::new(counts)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.name.as_str())
    }

    pub fn machine_count(&self) -> usize {
        self.index.len()
    }
}
