use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Process-wide one-shot signal that the application has begun quitting.
///
/// Clones share the same flag. Once marked it is never cleared.
#[derive(Clone, Debug, Default)]
pub struct TerminationFlag {
    terminating: Arc<AtomicBool>,
}

impl TerminationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the flag. Returns `true` only for the call that flipped it.
    pub fn mark(&self) -> bool {
        self.terminating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_terminating(&self) -> bool {
        self.terminating.load(Ordering::Acquire)
    }
}
