// src/cli.rs

//! CLI argument parsing using `clap`, plus `@file` argument expansion.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

/// How deep `@file` arguments may nest before we assume a loop.
const MAX_ARGFILE_DEPTH: usize = 16;

/// Command-line arguments for `taskdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskdag",
    version,
    about = "Build file-producing tasks in dependency order, resumably.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the task file (TOML).
    ///
    /// Default: `Taskdag.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Taskdag.toml")]
    pub config: String,

    /// Output root; overrides `[config].output_dir`. Created if absent.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Build the tasks matching this regex (repeatable, in order).
    #[arg(short = 'e', long = "execute", value_name = "REGEX", allow_hyphen_values = true)]
    pub execute: Vec<String>,

    /// Treat tasks matching this regex as done if their output exists.
    #[arg(short = 'f', long = "freeze", value_name = "REGEX", allow_hyphen_values = true)]
    pub freeze: Vec<String>,

    /// Keep running independent tasks after a failure.
    #[arg(short = 'k', long)]
    pub keep_going: bool,

    /// Print the tasks that would run, in order, and exit.
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Write `taskdag.dot` into the output root and render it with `dot`.
    #[arg(short = 'v', long)]
    pub visualize: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// The command line as typed (before `@file` expansion), used to print
    /// the resume command.
    #[arg(skip)]
    pub argv: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Replace every `@file` argument with the lines of `file`.
///
/// Each non-empty line is one argument, taken verbatim (no quoting or
/// whitespace splitting). Argfiles may reference other argfiles. The first
/// element (the program name) is never expanded.
pub fn expand_argfiles<I>(args: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut out = Vec::new();
    if let Some(program) = args.next() {
        out.push(program);
    }
    for arg in args {
        expand_one(arg, 0, &mut out)?;
    }
    Ok(out)
}

fn expand_one(arg: String, depth: usize, out: &mut Vec<String>) -> Result<()> {
    let Some(path) = arg.strip_prefix('@') else {
        out.push(arg);
        return Ok(());
    };

    if depth >= MAX_ARGFILE_DEPTH {
        bail!("argument files nested deeper than {MAX_ARGFILE_DEPTH} levels at @{path}");
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("reading argument file {path:?}"))?;
    for line in contents.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        expand_one(line.to_string(), depth + 1, out)?;
    }
    Ok(())
}

/// Parse an explicit argument list, expanding `@file` arguments first.
pub fn parse_from<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let raw: Vec<String> = args.into_iter().collect();
    let expanded = expand_argfiles(raw.clone())?;
    let mut parsed = CliArgs::try_parse_from(&expanded)?;
    parsed.argv = raw;
    Ok(parsed)
}

/// Parse the process arguments.
///
/// Exits with clap's usage message on invalid arguments, like
/// `CliArgs::parse()` would.
pub fn parse() -> Result<CliArgs> {
    let raw: Vec<String> = std::env::args().collect();
    let expanded = expand_argfiles(raw.clone())?;
    let mut parsed = CliArgs::parse_from(&expanded);
    parsed.argv = raw;
    Ok(parsed)
}
