// src/dag/dependents.rs

//! Reverse edges over a scenario.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::dag::registry::Registry;
use crate::dag::task::TaskId;

/// Map from a task to the tasks that directly depend on it.
pub type DependentIndex = HashMap<TaskId, BTreeSet<TaskId>>;

/// Build the dependent index for `scenario`.
///
/// Only edges where both ends are in `scenario` are recorded; every scenario
/// task gets an entry, possibly empty.
pub fn dependents_of(registry: &Registry, scenario: &[TaskId]) -> DependentIndex {
    let members: HashSet<TaskId> = scenario.iter().copied().collect();
    let mut index: DependentIndex = scenario
        .iter()
        .map(|&id| (id, BTreeSet::new()))
        .collect();

    for &task in scenario {
        for dep in registry.get(task).dependencies() {
            if members.contains(dep) {
                index.entry(*dep).or_default().insert(task);
            }
        }
    }

    index
}

/// Every task reachable from `root` through `index` (direct and indirect
/// dependents), excluding `root` itself.
pub fn transitive_dependents(index: &DependentIndex, root: TaskId) -> BTreeSet<TaskId> {
    let mut stack: Vec<TaskId> = vec![root];
    let mut found = BTreeSet::new();

    while let Some(id) = stack.pop() {
        if let Some(direct) = index.get(&id) {
            for &dependent in direct {
                if dependent != root && found.insert(dependent) {
                    stack.push(dependent);
                }
            }
        }
    }

    found
}
