// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod select;
pub mod types;
pub mod viz;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{build_registry, config_root_dir, load_and_validate};
use crate::dag::{Registry, TaskId, generate_scenario, referenced_frozen};
use crate::engine::checkpoint::resume_file_path;
use crate::engine::{
    CheckpointStore, Executor, ExecutorOptions, FileCheckpointStore, InterruptFlag, RunReport,
};
use crate::fs::{FileSystem, RealFileSystem};
use crate::select::select_tasks;
use crate::types::FailurePolicy;

/// How a run ended, when it did not end in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every scenario task completed, or this was a dry run.
    Success,
    /// Selection left no final task.
    NothingToBuild,
    /// Some tasks failed or were skipped; the resume file says how to finish.
    Incomplete,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::NothingToBuild | RunStatus::Incomplete => 1,
        }
    }
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - task file loading and registry construction
/// - `-e` / `-f` selection and scenario generation
/// - optional GraphViz output and dry-run listing
/// - Ctrl-C handling
/// - the sequential executor, on a blocking thread
pub async fn run(args: CliArgs) -> Result<RunStatus> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;
    let base_dir = config_root_dir(&config_path);

    let output_root = absolutize(match &args.output {
        Some(path) => path.clone(),
        None => base_dir.join(&cfg.config.output_dir),
    })?;
    let fs = RealFileSystem;
    fs.create_dir_all(&output_root)?;

    let interrupt = InterruptFlag::new();
    let (mut registry, defaults) = build_registry(&cfg, &base_dir, &output_root, &interrupt)?;

    let selection = select_tasks(&registry, &fs, &defaults, &args.execute, &args.freeze)?;
    if selection.final_tasks.is_empty() {
        eprintln!("taskdag: nothing to build");
        return Ok(RunStatus::NothingToBuild);
    }

    let final_tasks = selection.final_tasks;
    let frozen = selection.frozen;
    let scenario = generate_scenario(&registry, &fs, &final_tasks, &frozen)?;
    info!(
        finals = ?registry.names(&final_tasks),
        frozen = frozen.len(),
        tasks = scenario.len(),
        "resolved scenario"
    );

    if args.visualize {
        viz::write_and_render(&registry, &scenario, &final_tasks, &frozen)?;
    }

    if args.dry_run {
        print_dry_run(&registry, &scenario);
        return Ok(RunStatus::Success);
    }

    let policy = if args.keep_going {
        FailurePolicy::KeepGoing
    } else {
        cfg.config.on_failure
    };
    let resume_path = resume_file_path(&output_root);
    let options = ExecutorOptions {
        policy,
        dry_run: false,
        resume_command: Some(resume_command(&args.argv, &resume_path)),
    };
    let seed: Vec<String> = referenced_frozen(&registry, &scenario, &final_tasks, &frozen)
        .into_iter()
        .map(|id| registry.name_of(id).to_string())
        .collect();

    // Ctrl-C → stop after bookkeeping.
    let listener = {
        let flag = interrupt.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            warn!("interrupt received; stopping after the current task");
            flag.raise();
        })
    };

    let job = tokio::task::spawn_blocking(move || {
        execute(
            &mut registry,
            resume_path,
            &seed,
            &scenario,
            &final_tasks,
            interrupt,
            options,
        )
    });

    let outcome = match job.await {
        Ok(outcome) => outcome,
        // A panicking recipe is a bug in the task file's code, not a task
        // failure; let it unwind as-is.
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            listener.abort();
            return Err(e.into());
        }
    };
    listener.abort();

    let report = outcome?;
    if report.is_success() {
        Ok(RunStatus::Success)
    } else {
        Ok(RunStatus::Incomplete)
    }
}

/// Seed the resume file with the run's frozen tasks, then run the scenario.
fn execute(
    registry: &mut Registry,
    resume_path: PathBuf,
    seed: &[String],
    scenario: &[TaskId],
    final_tasks: &[TaskId],
    interrupt: InterruptFlag,
    options: ExecutorOptions,
) -> errors::Result<RunReport> {
    let mut store = FileCheckpointStore::new(resume_path);
    let seed: Vec<&str> = seed.iter().map(String::as_str).collect();
    store.rewrite(&seed)?;

    let fs = RealFileSystem;
    let mut executor = Executor::new(registry, &fs, &mut store, interrupt, options);
    executor.run(scenario, final_tasks)
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Command line that resumes this run: the original arguments with any
/// previous reference to the same resume file replaced by a fresh one.
pub fn resume_command(argv: &[String], resume_path: &Path) -> String {
    let mut args: Vec<String> = Vec::with_capacity(argv.len() + 1);
    match argv.split_first() {
        Some((program, rest)) => {
            args.push(program.clone());
            args.extend(
                rest.iter()
                    .filter(|arg| !refers_to(arg, resume_path))
                    .cloned(),
            );
        }
        None => args.push("taskdag".to_string()),
    }
    args.push(format!("@{}", resume_path.display()));

    args.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn refers_to(arg: &str, resume_path: &Path) -> bool {
    let Some(path) = arg.strip_prefix('@') else {
        return false;
    };
    let path = Path::new(path);
    if path == resume_path {
        return true;
    }
    match (std::fs::canonicalize(path), std::fs::canonicalize(resume_path)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./@=:,+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Dry-run output: the scenario's task names, one per line, in order.
fn print_dry_run(registry: &Registry, scenario: &[TaskId]) {
    for &id in scenario {
        println!("{}", registry.name_of(id));
    }

    debug!(tasks = scenario.len(), "dry-run complete (no execution)");
}
