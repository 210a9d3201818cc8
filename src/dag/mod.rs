// src/dag/mod.rs

//! Task graph: registry, scenario generation, and the graph queries the
//! executor relies on.
//!
//! - [`task`] defines tasks, ids and actions.
//! - [`registry`] owns tasks and enforces unique names.
//! - [`scenario`] turns final + frozen tasks into an execution order.
//! - [`dependents`] builds the reverse-edge index used to propagate failure.
//! - [`resume`] computes the freeze set that resumes an unfinished scenario.

pub mod dependents;
pub mod registry;
pub mod resume;
pub mod scenario;
pub mod task;

pub use dependents::{dependents_of, transitive_dependents, DependentIndex};
pub use registry::{Registry, Scope};
pub use resume::freeze_set_for_resume;
pub use scenario::{generate_scenario, referenced_frozen};
pub use task::{action, Action, BoxedAction, Task, TaskId, TaskName};
