// src/errors.rs

//! Crate-wide error type and aliases.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskdagError {
    #[error("Duplicate task: '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Dependency cycle detected while visiting task '{task}'")]
    SelfDependency { task: String },

    #[error("Output collision: tasks '{first}' and '{second}' both produce {path:?}")]
    OutputCollision {
        first: String,
        second: String,
        path: PathBuf,
    },

    #[error("Frozen task '{task}' is missing its output {path:?}")]
    FrozenTaskMissingOutput { task: String, path: PathBuf },

    #[error("Invalid scope '{0}': expected a relative subdirectory of the output root")]
    InvalidScope(String),

    #[error("No task matches pattern '{0}'")]
    NoMatchingTasks(String),

    #[error("Invalid task pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The run was interrupted (Ctrl-C). Returned after checkpoint bookkeeping.
    #[error("Interrupted")]
    Interrupted,

    /// A task hit an error that leaves the environment untrustworthy
    /// (out of memory, disk full). No bookkeeping was attempted.
    #[error("Fatal error in task '{task}': {source:#}")]
    Fatal {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskdagError>;
