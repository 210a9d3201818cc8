// tests/config_loading.rs

mod common;

use std::io::Write;

use common::names;
use taskdag::config::{ConfigFile, build_registry, load_and_validate};
use taskdag::engine::InterruptFlag;
use taskdag::errors::TaskdagError;
use taskdag::types::FailurePolicy;
use taskdag_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use tempfile::NamedTempFile;

fn load(contents: &str) -> Result<ConfigFile, TaskdagError> {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    load_and_validate(file.path())
}

#[test]
fn test_full_config_parses_with_defaults() {
    let cfg = load(
        r#"
[config]
default = ["c"]
on_failure = "keep_going"

[task.a]
cmd = "echo a"

[task.b]

[task.c]
cmd = "cat a b"
after = ["b", "a"]
"#,
    )
    .unwrap();

    assert_eq!(cfg.config.output_dir, "out");
    assert_eq!(cfg.config.on_failure, FailurePolicy::KeepGoing);
    assert_eq!(cfg.default_task_names(), vec!["c"]);
    assert!(cfg.task["b"].cmd.is_none());
    assert_eq!(cfg.task["c"].after, vec!["b", "a"]);
}

#[test]
fn test_unknown_dependency_returns_config_error() {
    let result = load(
        r#"
[task.A]
cmd = "echo A"
after = ["NonExistent"]
"#,
    );

    match result {
        Err(TaskdagError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_default_task_is_rejected() {
    let result = load(
        r#"
[config]
default = ["missing"]

[task.a]
cmd = "echo a"
"#,
    );
    assert!(matches!(result, Err(TaskdagError::ConfigError(msg)) if msg.contains("missing")));
}

#[test]
fn test_empty_config_is_rejected() {
    let result = load("[config]\noutput_dir = \"build\"\n");
    assert!(matches!(result, Err(TaskdagError::ConfigError(_))));
}

#[test]
fn test_bad_failure_policy_is_a_toml_error() {
    let result = load(
        r#"
[config]
on_failure = "sometimes"

[task.a]
"#,
    );
    assert!(matches!(result, Err(TaskdagError::TomlError(_))));
}

#[test]
fn test_absolute_task_name_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_task("/etc/passwd", TaskConfigBuilder::new("true").build())
        .raw();
    assert!(matches!(
        ConfigFile::try_from(raw),
        Err(TaskdagError::ConfigError(_))
    ));
}

#[test]
fn test_default_tasks_are_the_sinks_in_name_order() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_task("b", TaskConfigBuilder::new("true").build())
        .with_task("z", TaskConfigBuilder::new("true").after("a").build())
        .with_task("y", TaskConfigBuilder::new("true").after("z").build())
        .build();

    assert_eq!(cfg.default_task_names(), vec!["b", "y"]);
}

#[test]
fn test_build_registry_wires_dependencies_in_declared_order() {
    let cfg = ConfigFileBuilder::new()
        .with_task("vendor", TaskConfigBuilder::without_cmd().build())
        .with_task("a", TaskConfigBuilder::new("true").build())
        .with_task(
            "app",
            TaskConfigBuilder::new("true").after("vendor").after("a").build(),
        )
        .with_default("app")
        .build();

    let (reg, defaults) = build_registry(
        &cfg,
        std::path::Path::new("/project"),
        std::path::Path::new("/project/out"),
        &InterruptFlag::new(),
    )
    .unwrap();

    assert_eq!(reg.len(), 3);
    assert_eq!(names(&reg, &defaults), vec!["app"]);

    let app = reg.get(defaults[0]);
    assert_eq!(names(&reg, app.dependencies()), vec!["vendor", "a"]);
    assert_eq!(app.path(), std::path::Path::new("/project/out/app"));
    assert!(app.has_action());

    let vendor = reg.get(reg.find("vendor").unwrap());
    assert!(!vendor.has_action());
    assert!(vendor.is_done());
}

#[test]
fn test_cyclic_config_loads_but_fails_at_scenario_time() {
    let cfg = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("true").after("b").build())
        .with_task("b", TaskConfigBuilder::new("true").after("a").build())
        .with_default("a")
        .build();

    let (reg, defaults) = build_registry(
        &cfg,
        std::path::Path::new("/p"),
        std::path::Path::new("/p/out"),
        &InterruptFlag::new(),
    )
    .unwrap();

    let fs = taskdag::fs::mock::MockFileSystem::new();
    let result =
        taskdag::dag::generate_scenario(&reg, &fs, &defaults, &std::collections::HashSet::new());
    assert!(matches!(result, Err(TaskdagError::SelfDependency { .. })));
}
