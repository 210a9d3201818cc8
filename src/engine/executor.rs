// src/engine/executor.rs

//! Sequential scenario executor.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use tracing::{debug, error, info, warn};

use crate::dag::{Registry, TaskId, TaskName, dependents_of, freeze_set_for_resume, transitive_dependents};
use crate::engine::checkpoint::CheckpointStore;
use crate::engine::failure::{FailureKind, classify};
use crate::engine::interrupt::InterruptFlag;
use crate::engine::{RunReport, TaskFailure, TaskState};
use crate::errors::{Result, TaskdagError};
use crate::fs::FileSystem;
use crate::types::FailurePolicy;

/// Knobs for a single executor run.
#[derive(Debug, Clone, Default)]
pub struct ExecutorOptions {
    pub policy: FailurePolicy,
    /// Walk the scenario without invoking actions or touching the checkpoint.
    pub dry_run: bool,
    /// Command line printed to resume after a partial failure.
    ///
    /// If `None`, a generic `@<resume file>` hint is printed instead.
    pub resume_command: Option<String>,
}

/// Runs a scenario one task at a time, in order.
///
/// A task whose action returns `Ok` but whose output is missing afterwards
/// counts as an ordinary failure. Successful tasks are checkpointed immediately (durably, before the next
/// task starts). Failed tasks are classified:
/// - fatal errors are returned at once, without further bookkeeping;
/// - ordinary failures skip dependents (keep-going) or the rest of the run;
/// - interrupts always skip the rest of the run and are returned as
///   [`TaskdagError::Interrupted`] once the resume file has been rewritten.
pub struct Executor<'a> {
    registry: &'a mut Registry,
    fs: &'a dyn FileSystem,
    checkpoint: &'a mut dyn CheckpointStore,
    interrupt: InterruptFlag,
    options: ExecutorOptions,
}

impl<'a> Executor<'a> {
    pub fn new(
        registry: &'a mut Registry,
        fs: &'a dyn FileSystem,
        checkpoint: &'a mut dyn CheckpointStore,
        interrupt: InterruptFlag,
        options: ExecutorOptions,
    ) -> Self {
        Self {
            registry,
            fs,
            checkpoint,
            interrupt,
            options,
        }
    }

    /// Execute `scenario`, which must have been generated for `final_tasks`.
    ///
    /// A registry is good for one execution. Each task's action runs at most
    /// once per process: a task that failed here is already marked done, so a
    /// second `run` over the same registry reports it as done without running
    /// it. Build a fresh registry to retry.
    pub fn run(&mut self, scenario: &[TaskId], final_tasks: &[TaskId]) -> Result<RunReport> {
        let mut states = vec![TaskState::Pending; scenario.len()];
        let position: HashMap<TaskId, usize> = scenario
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();
        let index = dependents_of(self.registry, scenario);

        let mut failed: Vec<TaskFailure> = Vec::new();
        let mut interrupted = false;

        info!(tasks = scenario.len(), policy = ?self.options.policy, "executing scenario");

        for (i, &id) in scenario.iter().enumerate() {
            let name = self.registry.name_of(id).to_string();

            if states[i] == TaskState::Skipped {
                debug!(task = %name, "skipping task");
                continue;
            }

            if self.interrupt.is_raised() {
                warn!(task = %name, "interrupt pending; not starting further tasks");
                skip_remaining(&mut states, i);
                interrupted = true;
                break;
            }

            states[i] = TaskState::Running;
            info!(task = %name, step = i + 1, of = scenario.len(), "running task");

            let result = if self.options.dry_run {
                Ok(())
            } else {
                self.registry
                    .get_mut(id)
                    .run()
                    .and_then(|()| self.check_output(id))
            };

            let err = match result {
                Ok(()) => {
                    states[i] = TaskState::Done;
                    if !self.options.dry_run {
                        self.checkpoint.record_done(&name)?;
                    }
                    continue;
                }
                Err(err) => err,
            };

            let kind = classify(&err);
            let message = format!("{err:#}");
            if kind == FailureKind::Fatal {
                error!(task = %name, error = %message, "fatal task error; aborting without bookkeeping");
                return Err(TaskdagError::Fatal {
                    task: name,
                    source: err,
                });
            }

            error!(task = %name, error = %message, kind = ?kind, "task failed");
            states[i] = TaskState::Failed;
            failed.push(TaskFailure {
                task: name.clone(),
                error: message,
            });

            if kind == FailureKind::Failed && self.options.policy == FailurePolicy::KeepGoing {
                for dependent in transitive_dependents(&index, id) {
                    let j = position[&dependent];
                    if states[j] == TaskState::Pending {
                        debug!(
                            task = %self.registry.name_of(dependent),
                            upstream = %name,
                            "marking dependent Skipped due to upstream failure"
                        );
                        states[j] = TaskState::Skipped;
                    }
                }
            } else {
                skip_remaining(&mut states, i + 1);
                interrupted = kind == FailureKind::Interrupted;
                break;
            }
        }

        let report = self.finish(scenario, final_tasks, states, failed)?;

        if interrupted {
            return Err(TaskdagError::Interrupted);
        }
        Ok(report)
    }

    fn check_output(&self, id: TaskId) -> anyhow::Result<()> {
        let task = self.registry.get(id);
        if self.fs.exists(task.path()) {
            return Ok(());
        }
        Err(anyhow!(
            "task '{}' finished without producing {}",
            task.name(),
            task.path().display()
        ))
    }

    /// Post-loop bookkeeping: rewrite the resume file once if anything is
    /// left to do, and tell the user how to resume.
    fn finish(
        &mut self,
        scenario: &[TaskId],
        final_tasks: &[TaskId],
        states: Vec<TaskState>,
        failed: Vec<TaskFailure>,
    ) -> Result<RunReport> {
        let unfinished: HashSet<TaskId> = scenario
            .iter()
            .zip(&states)
            .filter(|(_, state)| state.is_unfinished())
            .map(|(&id, _)| id)
            .collect();

        let mut resume_freeze: Vec<TaskName> = Vec::new();
        if !unfinished.is_empty() {
            let freeze = freeze_set_for_resume(self.registry, scenario, final_tasks, &unfinished);
            resume_freeze = freeze
                .iter()
                .map(|&id| self.registry.name_of(id).to_string())
                .collect();

            if !self.options.dry_run {
                let names: Vec<&str> = resume_freeze.iter().map(String::as_str).collect();
                self.checkpoint.rewrite(&names)?;
            }
            self.print_summary(&failed, unfinished.len());
        }

        Ok(RunReport {
            tasks: scenario.iter().copied().zip(states).collect(),
            failed,
            resume_freeze,
        })
    }

    fn print_summary(&self, failed: &[TaskFailure], unfinished: usize) {
        if failed.is_empty() {
            eprintln!("taskdag: {unfinished} task(s) not run");
        } else {
            eprintln!("taskdag: {} task(s) failed:", failed.len());
            for failure in failed {
                eprintln!("  - {}: {}", failure.task, failure.error);
            }
        }

        let command = match (&self.options.resume_command, self.checkpoint.location()) {
            (Some(cmd), _) => cmd.clone(),
            (None, Some(path)) => format!("taskdag @{}", path.display()),
            (None, None) => return,
        };
        eprintln!("to resume, run:\n  {command}");
    }
}

fn skip_remaining(states: &mut [TaskState], from: usize) {
    for state in states.iter_mut().skip(from) {
        if *state == TaskState::Pending {
            *state = TaskState::Skipped;
        }
    }
}
