// src/dag/scenario.rs

//! Scenario generation: final tasks + frozen tasks -> execution order.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::dag::registry::Registry;
use crate::dag::task::TaskId;
use crate::errors::{Result, TaskdagError};
use crate::fs::FileSystem;

/// Who currently claims an output path during the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathOwner {
    /// The owning task is on the current DFS stack.
    Visiting,
    Done(TaskId),
}

struct Walk<'a> {
    registry: &'a Registry,
    fs: &'a dyn FileSystem,
    frozen: &'a HashSet<TaskId>,
    path_owner: HashMap<&'a Path, PathOwner>,
    output: Vec<TaskId>,
}

impl<'a> Walk<'a> {
    fn visit(&mut self, id: TaskId) -> Result<()> {
        let registry = self.registry;
        let task = registry.get(id);

        if self.frozen.contains(&id) {
            if !self.fs.exists(task.path()) {
                return Err(TaskdagError::FrozenTaskMissingOutput {
                    task: task.name().to_string(),
                    path: task.path().to_path_buf(),
                });
            }
            return Ok(());
        }

        match self.path_owner.get(task.path()) {
            Some(PathOwner::Visiting) => {
                return Err(TaskdagError::SelfDependency {
                    task: task.name().to_string(),
                });
            }
            Some(PathOwner::Done(owner)) if *owner == id => return Ok(()),
            Some(PathOwner::Done(owner)) => {
                return Err(TaskdagError::OutputCollision {
                    first: registry.name_of(*owner).to_string(),
                    second: task.name().to_string(),
                    path: task.path().to_path_buf(),
                });
            }
            None => {}
        }

        self.path_owner.insert(task.path(), PathOwner::Visiting);
        for &dep in task.dependencies() {
            self.visit(dep)?;
        }
        self.path_owner.insert(task.path(), PathOwner::Done(id));
        self.output.push(id);
        Ok(())
    }
}

/// Resolve `final_tasks` into a dependency-first execution order.
///
/// - Frozen tasks are treated as satisfied leaves and never appear in the
///   result; their outputs must exist.
/// - Order is the caller's order of `final_tasks`, then each task's declared
///   dependency order. Identical inputs give identical output.
/// - Fails on cycles, on two distinct tasks claiming one output path, and on
///   frozen tasks whose output is missing.
pub fn generate_scenario(
    registry: &Registry,
    fs: &dyn FileSystem,
    final_tasks: &[TaskId],
    frozen: &HashSet<TaskId>,
) -> Result<Vec<TaskId>> {
    let mut walk = Walk {
        registry,
        fs,
        frozen,
        path_owner: HashMap::new(),
        output: Vec::new(),
    };

    for &id in final_tasks {
        walk.visit(id)?;
    }

    debug!(
        finals = final_tasks.len(),
        frozen = frozen.len(),
        scenario = walk.output.len(),
        "generated scenario"
    );
    Ok(walk.output)
}

/// Frozen tasks that the scenario actually leans on: dependencies of
/// scenario tasks, or final tasks, that are in `frozen`.
///
/// Order follows the scenario, then `final_tasks`; each task appears once.
pub fn referenced_frozen(
    registry: &Registry,
    scenario: &[TaskId],
    final_tasks: &[TaskId],
    frozen: &HashSet<TaskId>,
) -> Vec<TaskId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    let candidates = scenario
        .iter()
        .flat_map(|&id| registry.get(id).dependencies().iter().copied())
        .chain(final_tasks.iter().copied());

    for id in candidates {
        if frozen.contains(&id) && seen.insert(id) {
            out.push(id);
        }
    }
    out
}
