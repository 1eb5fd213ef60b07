//! In-process stand-in for a platform wake lock.

use crate::framework::WakeCapability;
use tracing::{debug, info};

/// A non-reference-counted wake lock that only tracks state.
///
/// Acquiring twice and releasing once leaves it released, like a platform lock
/// created with reference counting turned off. Each transition is logged under
/// the lock's tag.
#[derive(Debug, Clone)]
pub struct SimulatedWakeLock {
    tag: String,
    held: bool,
    acquisitions: u64,
}

impl SimulatedWakeLock {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            held: false,
            acquisitions: 0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// How many times the lock went from released to held.
    pub fn acquisitions(&self) -> u64 {
        self.acquisitions
    }
}

impl WakeCapability for SimulatedWakeLock {
    fn acquire(&mut self) {
        if !self.held {
            self.acquisitions += 1;
        }
        self.held = true;
        info!(tag = %self.tag, acquisitions = self.acquisitions, "Wake lock acquired");
    }

    fn release(&mut self) {
        self.held = false;
        info!(tag = %self.tag, "Wake lock released");
    }

    fn is_held(&self) -> bool {
        debug!(tag = %self.tag, held = self.held, "Wake lock polled");
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_not_reference_counted() {
        let mut lock = SimulatedWakeLock::new("test");
        lock.acquire();
        lock.acquire();
        lock.release();
        assert!(!lock.is_held());
        assert_eq!(lock.acquisitions(), 1);
        assert_eq!(lock.tag(), "test");
    }
}
