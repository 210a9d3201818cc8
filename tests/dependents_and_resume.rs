mod common;

use std::collections::{BTreeSet, HashSet};

use common::{FakeActions, abcd, add, id, ids, names};
use taskdag::dag::{
    Registry, TaskId, dependents_of, freeze_set_for_resume, generate_scenario,
    transitive_dependents,
};
use taskdag::fs::mock::MockFileSystem;

fn set(registry: &Registry, names: &[&str]) -> BTreeSet<TaskId> {
    ids(registry, names).into_iter().collect()
}

/// a, b independent; c <- {a, b}; d <- c.
fn chain(reg: &mut Registry) {
    add(reg, "a", &[], None);
    add(reg, "b", &[], None);
    add(reg, "c", &["a", "b"], None);
    add(reg, "d", &["c"], None);
}

#[test]
fn test_dependents_of_records_direct_edges() {
    let mut reg = Registry::new("/out");
    chain(&mut reg);
    let scenario = ids(&reg, &["a", "b", "c", "d"]);

    let index = dependents_of(&reg, &scenario);
    assert_eq!(index[&id(&reg, "a")], set(&reg, &["c"]));
    assert_eq!(index[&id(&reg, "b")], set(&reg, &["c"]));
    assert_eq!(index[&id(&reg, "c")], set(&reg, &["d"]));
    assert!(index[&id(&reg, "d")].is_empty());
}

#[test]
fn test_transitive_dependents_follow_the_chain() {
    let mut reg = Registry::new("/out");
    chain(&mut reg);
    let scenario = ids(&reg, &["a", "b", "c", "d"]);
    let index = dependents_of(&reg, &scenario);

    assert_eq!(
        transitive_dependents(&index, id(&reg, "a")),
        set(&reg, &["c", "d"])
    );
    assert!(transitive_dependents(&index, id(&reg, "d")).is_empty());
}

#[test]
fn test_dependents_ignore_edges_leaving_the_scenario() {
    let mut reg = Registry::new("/out");
    abcd(&mut reg, &FakeActions::new());
    // Scenario for d only: c depends on a but is not part of it.
    let scenario = ids(&reg, &["a", "d"]);

    let index = dependents_of(&reg, &scenario);
    assert_eq!(index.len(), 2);
    assert_eq!(index[&id(&reg, "a")], set(&reg, &["d"]));
}

/// a, b; c <- {a, b}; e <- c; f <- c.
fn fan_out(reg: &mut Registry) {
    add(reg, "a", &[], None);
    add(reg, "b", &[], None);
    add(reg, "c", &["a", "b"], None);
    add(reg, "e", &["c"], None);
    add(reg, "f", &["c"], None);
}

#[test]
fn test_resume_freeze_set_is_minimal() {
    let mut reg = Registry::new("/out");
    fan_out(&mut reg);
    let finals = ids(&reg, &["e", "f"]);
    let fs = MockFileSystem::new();

    let scenario = generate_scenario(&reg, &fs, &finals, &HashSet::new()).unwrap();
    assert_eq!(names(&reg, &scenario), vec!["a", "b", "c", "e", "f"]);

    let skipped: HashSet<TaskId> = ids(&reg, &["b", "c", "e", "f"]).into_iter().collect();
    let freeze = freeze_set_for_resume(&reg, &scenario, &finals, &skipped);
    assert_eq!(names(&reg, &freeze), vec!["a"]);

    // a completed, so its output exists.
    fs.add_file(reg.path_for("a"));
    let frozen: HashSet<TaskId> = freeze.into_iter().collect();
    let resumed = generate_scenario(&reg, &fs, &finals, &frozen).unwrap();
    assert_eq!(names(&reg, &resumed), vec!["b", "c", "e", "f"]);
}

#[test]
fn test_resume_keeps_previously_frozen_tasks_frozen() {
    let mut reg = Registry::new("/out");
    fan_out(&mut reg);
    let finals = ids(&reg, &["e", "f"]);
    let fs = MockFileSystem::new();
    fs.add_file(reg.path_for("b"));

    let frozen: HashSet<TaskId> = ids(&reg, &["b"]).into_iter().collect();
    let scenario = generate_scenario(&reg, &fs, &finals, &frozen).unwrap();
    assert_eq!(names(&reg, &scenario), vec!["a", "c", "e", "f"]);

    // a, c and e done; f failed.
    let skipped: HashSet<TaskId> = ids(&reg, &["f"]).into_iter().collect();
    let freeze = freeze_set_for_resume(&reg, &scenario, &finals, &skipped);
    assert_eq!(names(&reg, &freeze), vec!["e", "c"]);

    for name in ["a", "c", "e"] {
        fs.add_file(reg.path_for(name));
    }
    let frozen: HashSet<TaskId> = freeze.into_iter().collect();
    let resumed = generate_scenario(&reg, &fs, &finals, &frozen).unwrap();
    assert_eq!(names(&reg, &resumed), vec!["f"]);
}

#[test]
fn test_resume_after_nothing_ran_freezes_only_old_frozen_tasks() {
    let mut reg = Registry::new("/out");
    fan_out(&mut reg);
    let finals = ids(&reg, &["e"]);
    let fs = MockFileSystem::new();
    fs.add_file(reg.path_for("a"));

    let frozen: HashSet<TaskId> = ids(&reg, &["a"]).into_iter().collect();
    let scenario = generate_scenario(&reg, &fs, &finals, &frozen).unwrap();
    let skipped: HashSet<TaskId> = scenario.iter().copied().collect();

    let freeze = freeze_set_for_resume(&reg, &scenario, &finals, &skipped);
    assert_eq!(names(&reg, &freeze), vec!["a"]);
}
