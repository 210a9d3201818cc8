// src/engine/interrupt.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "the user pressed Ctrl-C" flag.
///
/// Set by the signal listener in [`crate::run`]; read by the executor between
/// tasks and by shell recipes while their child process runs.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
