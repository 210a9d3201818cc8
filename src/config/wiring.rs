// src/config/wiring.rs

//! Turn a validated [`ConfigFile`] into a populated [`Registry`].

use std::path::Path;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::dag::{BoxedAction, Registry, TaskId};
use crate::engine::InterruptFlag;
use crate::errors::{Result, TaskdagError};
use crate::exec::ShellAction;

/// Register every task of `cfg` under `output_root` and resolve the default
/// final tasks.
///
/// Tasks are registered in name order first, then their `after` edges are
/// added in declaration order, so a task may name a dependency declared
/// later in the file. Shell recipes run in `base_dir`.
pub fn build_registry(
    cfg: &ConfigFile,
    base_dir: &Path,
    output_root: &Path,
    interrupt: &InterruptFlag,
) -> Result<(Registry, Vec<TaskId>)> {
    let mut registry = Registry::new(output_root);

    for (name, tc) in cfg.task.iter() {
        let output = registry.path_for(name);
        let action = tc.cmd.as_ref().map(|cmd| {
            Box::new(ShellAction::new(
                name.as_str(),
                cmd.as_str(),
                base_dir,
                output,
                interrupt.clone(),
            )) as BoxedAction
        });
        registry.register(name, &[], action)?;
    }

    for (name, tc) in cfg.task.iter() {
        let task = lookup(&registry, name)?;
        for dep in tc.after.iter() {
            let dep_id = lookup(&registry, dep)?;
            registry.add_dependency(task, dep_id);
        }
    }

    let defaults = cfg
        .default_task_names()
        .iter()
        .map(|name| lookup(&registry, name))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        tasks = registry.len(),
        defaults = ?registry.names(&defaults),
        "built task registry from config"
    );

    Ok((registry, defaults))
}

fn lookup(registry: &Registry, name: &str) -> Result<TaskId> {
    registry
        .find(name)
        .ok_or_else(|| TaskdagError::ConfigError(format!("unknown task '{}'", name)))
}
