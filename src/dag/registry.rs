// src/dag/registry.rs

//! Write-once namespace of tasks.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::dag::task::{BoxedAction, Task, TaskId, TaskName};
use crate::errors::{Result, TaskdagError};

/// Owns every [`Task`] of a run and maps names to ids.
///
/// A registry is built once per process (or per test) and passed by
/// reference; tasks are never removed. Output paths are derived from names,
/// joined onto `output_root`.
#[derive(Debug)]
pub struct Registry {
    output_root: PathBuf,
    tasks: Vec<Task>,
    by_name: HashMap<TaskName, TaskId>,
}

impl Registry {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            tasks: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Output path a task named `name` gets (or has) in this registry.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.output_root.join(name)
    }

    /// Register a new task. Fails with [`TaskdagError::DuplicateTask`] if the
    /// name is taken.
    pub fn register(
        &mut self,
        name: &str,
        deps: &[TaskId],
        action: Option<BoxedAction>,
    ) -> Result<TaskId> {
        if self.by_name.contains_key(name) {
            return Err(TaskdagError::DuplicateTask(name.to_string()));
        }
        Ok(self.insert(name, deps, action))
    }

    /// Register a task, or return the existing one with the same name.
    ///
    /// When the name already exists the supplied `deps` and `action` are
    /// dropped; the first registration wins.
    pub fn register_or_merge(
        &mut self,
        name: &str,
        deps: &[TaskId],
        action: Option<BoxedAction>,
    ) -> TaskId {
        match self.by_name.get(name) {
            Some(&id) => {
                if action.is_some() {
                    warn!(task = %name, "merge-registration discarded a second action");
                }
                id
            }
            None => self.insert(name, deps, action),
        }
    }

    fn insert(&mut self, name: &str, deps: &[TaskId], action: Option<BoxedAction>) -> TaskId {
        let id = TaskId::new(self.tasks.len());
        let path = self.path_for(name);
        debug!(task = %name, path = ?path, deps = deps.len(), "registered task");
        self.tasks
            .push(Task::new(name.to_string(), path, deps.to_vec(), action));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Append a dependency edge to an already registered task.
    ///
    /// Used when tasks are declared before their dependencies exist (config
    /// files). No cycle check happens here; scenario generation reports
    /// cycles.
    pub fn add_dependency(&mut self, task: TaskId, dep: TaskId) {
        self.tasks[task.index()].push_dependency(dep);
    }

    /// Builder view that prefixes every registered name with `subdir/`.
    ///
    /// `subdir` must be a non-empty relative path without `..` components,
    /// so scoped outputs stay under the output root.
    pub fn scope(&mut self, subdir: &str) -> Result<Scope<'_>> {
        let prefix = subdir.trim_end_matches('/');
        let path = Path::new(prefix);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if prefix.is_empty() || path.is_absolute() || escapes {
            return Err(TaskdagError::InvalidScope(subdir.to_string()));
        }

        Ok(Scope {
            registry: self,
            prefix: prefix.to_string(),
        })
    }

    /// Look up a task by id.
    ///
    /// Panics if `id` was issued by another registry.
    pub fn get(&self, id: TaskId) -> &Task {
        &self.tasks[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: TaskId) -> &str {
        self.get(id).name()
    }

    /// Names of the given tasks, in the given order.
    pub fn names(&self, ids: &[TaskId]) -> Vec<&str> {
        ids.iter().map(|&id| self.name_of(id)).collect()
    }

    /// All tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks
            .iter()
            .enumerate()
            .map(|(i, task)| (TaskId::new(i), task))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Registration view scoped to an output subdirectory.
#[derive(Debug)]
pub struct Scope<'a> {
    registry: &'a mut Registry,
    prefix: String,
}

impl Scope<'_> {
    fn qualify(&self, name: &str) -> String {
        format!("{}/{}", self.prefix, name)
    }

    pub fn register(
        &mut self,
        name: &str,
        deps: &[TaskId],
        action: Option<BoxedAction>,
    ) -> Result<TaskId> {
        let name = self.qualify(name);
        self.registry.register(&name, deps, action)
    }

    pub fn register_or_merge(
        &mut self,
        name: &str,
        deps: &[TaskId],
        action: Option<BoxedAction>,
    ) -> TaskId {
        let name = self.qualify(name);
        self.registry.register_or_merge(&name, deps, action)
    }
}
