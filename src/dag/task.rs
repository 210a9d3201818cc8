// src/dag/task.rs

//! Task identity, recipes and the per-task completion flag.

use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Handle to a task owned by a [`Registry`](crate::dag::Registry).
///
/// Ids are only meaningful for the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);

impl TaskId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// The work a task performs.
///
/// An action is expected to have produced the task's output path by the time
/// it returns `Ok`. Errors are classified by the executor, see
/// [`crate::engine::failure`].
pub trait Action: Send + Sync {
    fn run(&self) -> anyhow::Result<()>;
}

impl<F> Action for F
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    fn run(&self) -> anyhow::Result<()> {
        self()
    }
}

pub type BoxedAction = Box<dyn Action>;

/// Wrap a closure as an optional boxed action, ready for
/// [`Registry::register`](crate::dag::Registry::register).
pub fn action<F>(f: F) -> Option<BoxedAction>
where
    F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
{
    Some(Box::new(f))
}

/// A named unit of build work with exactly one output artifact.
pub struct Task {
    name: TaskName,
    path: PathBuf,
    deps: Vec<TaskId>,
    action: Option<BoxedAction>,
    done: bool,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("deps", &self.deps)
            .field("has_action", &self.action.is_some())
            .field("done", &self.done)
            .finish()
    }
}

impl Task {
    pub(crate) fn new(
        name: TaskName,
        path: PathBuf,
        deps: Vec<TaskId>,
        action: Option<BoxedAction>,
    ) -> Self {
        let done = action.is_none();
        Self {
            name,
            path,
            deps,
            action,
            done,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Output artifact this task is responsible for.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Direct dependencies, in declared order.
    pub fn dependencies(&self) -> &[TaskId] {
        &self.deps
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// `true` if the task has no action or its action has been invoked.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn push_dependency(&mut self, dep: TaskId) {
        self.deps.push(dep);
    }

    /// Invoke the action at most once.
    ///
    /// `done` flips before the call, so an action that fails is still
    /// considered invoked and will not be retried within this process.
    pub(crate) fn run(&mut self) -> anyhow::Result<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        match &self.action {
            Some(action) => action.run(),
            None => Ok(()),
        }
    }
}
