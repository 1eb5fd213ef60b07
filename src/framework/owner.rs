//! # Resource Owner
//!
//! The single authoritative holder of the wake lock. It sits between the actor and the
//! platform [`WakeCapability`] and makes acquire/release idempotent, so the capability
//! never sees a double acquire or a release of a lock it does not hold.

use tracing::{debug, warn};

use crate::framework::core::WakeCapability;

/// Wraps a [`WakeCapability`] and enforces idempotent transitions.
///
/// Not thread-safe by design: only the [`RequestActor`](crate::framework::RequestActor)
/// task calls it. Dropping an owner that still holds the lock releases it first.
pub struct ResourceOwner<C: WakeCapability> {
    capability: C,
}

impl<C: WakeCapability> ResourceOwner<C> {
    pub fn new(capability: C) -> Self {
        Self { capability }
    }

    /// Takes the lock. No-op if already held.
    pub fn acquire(&mut self) {
        if self.capability.is_held() {
            debug!("acquire: already held");
            return;
        }
        self.capability.acquire();
    }

    /// Gives the lock back. No-op if already released.
    pub fn release(&mut self) {
        if !self.capability.is_held() {
            debug!("release: already released");
            return;
        }
        self.capability.release();
    }

    pub fn is_held(&self) -> bool {
        self.capability.is_held()
    }

    /// Consumes the owner, releasing the lock if it is still held.
    ///
    /// Returns whether a release was needed.
    pub fn shutdown(mut self) -> bool {
        let was_held = self.is_held();
        if was_held {
            self.release();
        }
        was_held
    }
}

impl<C: WakeCapability> Drop for ResourceOwner<C> {
    fn drop(&mut self) {
        if self.capability.is_held() {
            warn!("Owner dropped while holding the lock, forcing release");
            self.capability.release();
        }
    }
}
