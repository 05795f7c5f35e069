use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared gate over the non-status tabs. Owned by the shell; the startup
/// coordinator only requests transitions. Idempotent and callable from any
/// thread.
#[derive(Debug, Clone)]
pub struct TabLock {
    locked: Arc<AtomicBool>,
}

impl TabLock {
    pub fn new_locked() -> Self {
        Self {
            locked: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn new_unlocked() -> Self {
        Self {
            locked: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns true when the call actually transitioned the gate.
    pub fn lock(&self) -> bool {
        !self.locked.swap(true, Ordering::SeqCst)
    }

    /// Returns true when the call actually transitioned the gate.
    pub fn unlock(&self) -> bool {
        self.locked.swap(false, Ordering::SeqCst)
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }
}

impl Default for TabLock {
    fn default() -> Self {
        Self::new_locked()
    }
}
