// src/engine/mod.rs

//! Execution engine for taskdag.
//!
//! - [`executor`] runs a scenario sequentially and applies the failure policy.
//! - [`checkpoint`] persists completed work and the final resume recipe.
//! - [`failure`] classifies recipe errors.
//! - [`interrupt`] carries Ctrl-C from the async shell into the sequential core.

use crate::dag::{TaskId, TaskName};

/// Per-task state within one executor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

impl TaskState {
    /// Whether the task still has work outstanding after the run.
    pub fn is_unfinished(self) -> bool {
        !matches!(self, TaskState::Done)
    }
}

/// A task whose action returned an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub task: TaskName,
    pub error: String,
}

/// Outcome of a completed (not fatally aborted) executor run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Every scenario task with its final state, in scenario order.
    pub tasks: Vec<(TaskId, TaskState)>,
    pub failed: Vec<TaskFailure>,
    /// Tasks written to the resume file; empty when everything completed.
    pub resume_freeze: Vec<TaskName>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.tasks.iter().all(|(_, state)| *state == TaskState::Done)
    }

    pub fn state_of(&self, id: TaskId) -> Option<TaskState> {
        self.tasks
            .iter()
            .find(|(task, _)| *task == id)
            .map(|(_, state)| *state)
    }

    /// Tasks that ended in `state`, in scenario order.
    pub fn tasks_in(&self, state: TaskState) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|(_, s)| *s == state)
            .map(|(id, _)| *id)
            .collect()
    }
}

pub mod checkpoint;
pub mod executor;
pub mod failure;
pub mod interrupt;

pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use executor::{Executor, ExecutorOptions};
pub use failure::{FailureKind, classify};
pub use interrupt::InterruptFlag;
