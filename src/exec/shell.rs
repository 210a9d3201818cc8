// src/exec/shell.rs

//! Shell-command recipes.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{debug, info, warn};

use crate::dag::{Action, TaskName};
use crate::engine::InterruptFlag;
use crate::errors::TaskdagError;

/// How often a running child is checked for exit or interrupt.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs `cmd` through the platform shell to produce one output file.
///
/// The child runs in `workdir` with `TASKDAG_TASK` and `TASKDAG_OUTPUT` set,
/// and inherits stdout/stderr. When the interrupt flag is raised the child
/// is killed and the action reports [`TaskdagError::Interrupted`].
#[derive(Debug, Clone)]
pub struct ShellAction {
    task: TaskName,
    cmd: String,
    workdir: PathBuf,
    output: PathBuf,
    interrupt: InterruptFlag,
}

impl ShellAction {
    pub fn new(
        task: impl Into<TaskName>,
        cmd: impl Into<String>,
        workdir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        interrupt: InterruptFlag,
    ) -> Self {
        Self {
            task: task.into(),
            cmd: cmd.into(),
            workdir: workdir.into(),
            output: output.into(),
            interrupt,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        cmd.current_dir(&self.workdir)
            .env("TASKDAG_TASK", &self.task)
            .env("TASKDAG_OUTPUT", &self.output)
            .stdin(Stdio::null());
        cmd
    }

    fn check_status(&self, status: ExitStatus) -> Result<()> {
        if status.success() {
            if !self.output.exists() {
                warn!(
                    task = %self.task,
                    output = ?self.output,
                    "command succeeded but did not produce its output"
                );
                bail!(
                    "command `{}` succeeded but did not produce {}",
                    self.cmd,
                    self.output.display()
                );
            }
            return Ok(());
        }

        if killed_by_interrupt(&status) || self.interrupt.is_raised() {
            return Err(TaskdagError::Interrupted.into());
        }

        match status.code() {
            Some(code) => bail!("command `{}` exited with status {}", self.cmd, code),
            None => bail!("command `{}` was terminated by a signal", self.cmd),
        }
    }
}

impl Action for ShellAction {
    fn run(&self) -> Result<()> {
        if let Some(parent) = self.output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {:?}", parent))?;
        }

        info!(task = %self.task, cmd = %self.cmd, "starting task process");

        let mut child = self
            .command()
            .spawn()
            .with_context(|| format!("spawning process for task '{}'", self.task))?;

        loop {
            let waited = child
                .try_wait()
                .with_context(|| format!("waiting for process of task '{}'", self.task))?;

            if let Some(status) = waited {
                debug!(task = %self.task, code = ?status.code(), "task process exited");
                return self.check_status(status);
            }

            if self.interrupt.is_raised() {
                info!(task = %self.task, "interrupt requested; killing task process");
                if let Err(e) = child.kill() {
                    warn!(task = %self.task, error = %e, "failed to kill child process on interrupt");
                }
                let _ = child.wait();
                return Err(TaskdagError::Interrupted.into());
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(unix)]
fn killed_by_interrupt(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;
    // SIGINT
    status.signal() == Some(2)
}

#[cfg(not(unix))]
fn killed_by_interrupt(_status: &ExitStatus) -> bool {
    false
}
