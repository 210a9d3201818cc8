#![allow(dead_code)]

use std::path::Path;

use taskdag::dag::{BoxedAction, Registry, TaskId};

pub use taskdag_test_utils::fake_actions::FakeActions;
pub use taskdag_test_utils::init_tracing;

/// Register `name` with dependencies looked up by name.
pub fn add(
    registry: &mut Registry,
    name: &str,
    deps: &[&str],
    action: Option<BoxedAction>,
) -> TaskId {
    let deps: Vec<TaskId> = deps.iter().map(|d| id(registry, d)).collect();
    registry
        .register(name, &deps, action)
        .expect("registering test task")
}

pub fn id(registry: &Registry, name: &str) -> TaskId {
    registry
        .find(name)
        .unwrap_or_else(|| panic!("no task named {name}"))
}

pub fn ids(registry: &Registry, names: &[&str]) -> Vec<TaskId> {
    names.iter().map(|n| id(registry, n)).collect()
}

pub fn names(registry: &Registry, ids: &[TaskId]) -> Vec<String> {
    registry.names(ids).into_iter().map(String::from).collect()
}

/// a, b independent; c <- {a, b}; d <- a.
pub fn abcd(registry: &mut Registry, actions: &FakeActions) {
    add(registry, "a", &[], actions.succeed("a"));
    add(registry, "b", &[], actions.succeed("b"));
    add(registry, "c", &["a", "b"], actions.succeed("c"));
    add(registry, "d", &["a"], actions.succeed("d"));
}

/// Same shape as [`abcd`], but every action writes its output file.
pub fn abcd_on_disk(registry: &mut Registry, actions: &FakeActions) {
    for (name, deps) in [
        ("a", &[][..]),
        ("b", &[][..]),
        ("c", &["a", "b"][..]),
        ("d", &["a"][..]),
    ] {
        let path = registry.path_for(name);
        add(registry, name, deps, actions.touch(name, path));
    }
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}
