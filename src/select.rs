// src/select.rs

//! Regex-driven task selection (`-e` / `-f`).

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::dag::{Registry, TaskId, dependents_of, transitive_dependents};
use crate::errors::{Result, TaskdagError};
use crate::fs::FileSystem;

/// Final and frozen tasks resolved from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Tasks to build, in selection order.
    pub final_tasks: Vec<TaskId>,
    /// Tasks whose outputs exist and are to be treated as satisfied.
    pub frozen: HashSet<TaskId>,
    /// Tasks dropped because a frozen match had no output, plus their
    /// dependents. Sorted by id.
    pub impossible: Vec<TaskId>,
}

/// Tasks reachable from `defaults` through dependency edges, in
/// registration order. Cycles are tolerated here.
pub fn reachable_from(registry: &Registry, defaults: &[TaskId]) -> Vec<TaskId> {
    let mut seen: HashSet<TaskId> = HashSet::new();
    let mut stack: Vec<TaskId> = defaults.to_vec();

    while let Some(id) = stack.pop() {
        if seen.insert(id) {
            stack.extend(registry.get(id).dependencies().iter().copied());
        }
    }

    registry
        .tasks()
        .map(|(id, _)| id)
        .filter(|id| seen.contains(id))
        .collect()
}

fn compile(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

fn matching<'r>(
    registry: &'r Registry,
    candidates: &'r [TaskId],
    re: &'r Regex,
) -> impl Iterator<Item = TaskId> + 'r {
    candidates
        .iter()
        .copied()
        .filter(move |&id| re.is_match(registry.name_of(id)))
}

/// Resolve `-e` and `-f` patterns against the default-reachable tasks.
///
/// - No `-e` patterns: the final tasks are `defaults`.
/// - Each `-e` pattern, in order, appends every matching task not already
///   selected; a task matched by several patterns is placed by the first.
/// - Each `-f` match with an existing output is frozen. A match without an
///   output makes that task and all its dependents impossible; they are
///   removed from the final tasks.
/// - A pattern matching no candidate at all is an error.
pub fn select_tasks(
    registry: &Registry,
    fs: &dyn FileSystem,
    defaults: &[TaskId],
    include: &[String],
    freeze: &[String],
) -> Result<Selection> {
    let candidates = reachable_from(registry, defaults);

    let mut final_tasks: Vec<TaskId> = Vec::new();
    if include.is_empty() {
        final_tasks.extend_from_slice(defaults);
    } else {
        let mut selected: HashSet<TaskId> = HashSet::new();
        for pattern in include {
            let re = compile(pattern)?;
            let mut matched = false;
            for id in matching(registry, &candidates, &re) {
                matched = true;
                if selected.insert(id) {
                    final_tasks.push(id);
                }
            }
            if !matched {
                return Err(TaskdagError::NoMatchingTasks(pattern.clone()));
            }
        }
    }

    let mut frozen: HashSet<TaskId> = HashSet::new();
    let mut impossible: HashSet<TaskId> = HashSet::new();
    if !freeze.is_empty() {
        let index = dependents_of(registry, &candidates);
        for pattern in freeze {
            let re = compile(pattern)?;
            let mut matched = false;
            for id in matching(registry, &candidates, &re) {
                matched = true;
                let task = registry.get(id);
                if fs.exists(task.path()) {
                    debug!(task = %task.name(), "freezing task");
                    frozen.insert(id);
                } else {
                    warn!(
                        task = %task.name(),
                        path = ?task.path(),
                        "cannot freeze task without output; dropping it and its dependents"
                    );
                    impossible.insert(id);
                    impossible.extend(transitive_dependents(&index, id));
                }
            }
            if !matched {
                return Err(TaskdagError::NoMatchingTasks(pattern.clone()));
            }
        }
    }

    if !impossible.is_empty() {
        final_tasks.retain(|id| {
            let keep = !impossible.contains(id);
            if !keep {
                info!(task = %registry.name_of(*id), "final task is impossible; removed");
            }
            keep
        });
    }

    let mut impossible: Vec<TaskId> = impossible.into_iter().collect();
    impossible.sort();

    Ok(Selection {
        final_tasks,
        frozen,
        impossible,
    })
}
