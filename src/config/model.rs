// src/config/model.rs

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::types::FailurePolicy;

/// Top-level task file as read from TOML.
///
/// ```toml
/// [config]
/// output_dir = "out"
/// default = ["e", "f"]
/// on_failure = "keep_going"
///
/// [task.a]
/// cmd = "echo a > \"$TASKDAG_OUTPUT\""
///
/// [task.c]
/// cmd = "cat a b > \"$TASKDAG_OUTPUT\""
/// after = ["a", "b"]
/// ```
///
/// All sections are optional at parse time; [`ConfigFile`] is the validated
/// form the rest of the crate consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,
}

/// Validated task file. Construct with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: BTreeMap<String, TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, task: BTreeMap<String, TaskConfig>) -> Self {
        Self { config, task }
    }

    /// Names of the default final tasks.
    ///
    /// `[config].default` when given, otherwise every task that no other task
    /// lists in `after`, in name order.
    pub fn default_task_names(&self) -> Vec<String> {
        if let Some(ref names) = self.config.default {
            return names.clone();
        }

        let depended_on: HashSet<&str> = self
            .task
            .values()
            .flat_map(|t| t.after.iter().map(String::as_str))
            .collect();

        self.task
            .keys()
            .filter(|name| !depended_on.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Output root, relative to the task file's directory unless absolute.
    /// Overridden by `-o`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default final tasks when no `-e` pattern is given.
    #[serde(default)]
    pub default: Option<Vec<String>>,

    /// Failure policy when `-k` is not passed.
    #[serde(default)]
    pub on_failure: FailurePolicy,
}

fn default_output_dir() -> String {
    "out".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default: None,
            on_failure: FailurePolicy::default(),
        }
    }
}

/// `[task.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    /// Shell command producing `$TASKDAG_OUTPUT`.
    ///
    /// A task without `cmd` is considered already complete; its output is
    /// expected to exist.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Dependencies, in the order they are resolved.
    #[serde(default)]
    pub after: Vec<String>,
}
