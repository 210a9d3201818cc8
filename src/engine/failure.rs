// src/engine/failure.rs

//! Classification of recipe errors into scheduling decisions.

use std::io;

use crate::errors::TaskdagError;

/// How the executor reacts to a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Ordinary failure: skip dependents (keep-going) or abort the rest.
    Failed,
    /// User interrupt: abort the rest, do bookkeeping, then return
    /// [`TaskdagError::Interrupted`].
    Interrupted,
    /// Out of memory or disk full: propagate immediately, no bookkeeping.
    Fatal,
}

/// Walk the error chain and decide how to treat it.
///
/// The first recognised cause wins, starting from the outermost error.
pub fn classify(err: &anyhow::Error) -> FailureKind {
    for cause in err.chain() {
        if let Some(own) = cause.downcast_ref::<TaskdagError>() {
            match own {
                TaskdagError::Interrupted => return FailureKind::Interrupted,
                TaskdagError::Fatal { .. } => return FailureKind::Fatal,
                _ => {}
            }
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if is_environment_fatal(io_err) {
                return FailureKind::Fatal;
            }
        }
    }
    FailureKind::Failed
}

fn is_environment_fatal(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::StorageFull | io::ErrorKind::OutOfMemory
    )
}
