// src/dag/resume.rs

//! Minimal freeze set that reproduces the unfinished part of a scenario.

use std::collections::HashSet;

use crate::dag::registry::Registry;
use crate::dag::task::TaskId;

struct Planner<'a> {
    registry: &'a Registry,
    scenario: HashSet<TaskId>,
    skipped: &'a HashSet<TaskId>,
    walked: HashSet<TaskId>,
    out: Vec<TaskId>,
}

impl Planner<'_> {
    fn walk(&mut self, id: TaskId) {
        if !self.walked.insert(id) {
            return;
        }

        let finished = !self.scenario.contains(&id) || !self.skipped.contains(&id);
        if finished {
            self.out.push(id);
            return;
        }

        let registry = self.registry;
        for &dep in registry.get(id).dependencies() {
            self.walk(dep);
        }
    }
}

/// Compute the tasks to freeze so that regenerating a scenario for
/// `final_tasks` yields exactly `skipped`.
///
/// The result is the frontier between finished work (tasks outside the
/// scenario, which were frozen, or tasks that completed) and the skipped
/// remainder. Every task in it has its output on disk.
pub fn freeze_set_for_resume(
    registry: &Registry,
    scenario: &[TaskId],
    final_tasks: &[TaskId],
    skipped: &HashSet<TaskId>,
) -> Vec<TaskId> {
    let mut planner = Planner {
        registry,
        scenario: scenario.iter().copied().collect(),
        skipped,
        walked: HashSet::new(),
        out: Vec::new(),
    };

    for &id in final_tasks {
        planner.walk(id);
    }

    planner.out
}
