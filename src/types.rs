use serde::Deserialize;

/// What the executor does when a task fails.
///
/// - `Abort`: skip every remaining task in the scenario and stop (default).
/// - `KeepGoing`: skip only the failed task and everything that depends on it;
///   independent tasks still run. Interrupts always abort regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    Abort,
    KeepGoing,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Abort
    }
}
