//! # Mock Framework
//!
//! Utilities for testing the actor without a platform wake lock.
//!
//! [`MockWakeLock`] is a [`WakeCapability`] that journals every call it receives.
//! Clones share the journal, so a test hands one clone to the actor and keeps another
//! to inspect what the actor did.
//!
//! Use [`MockWakeLock::calls`] for direct assertions, or queue expectations with
//! [`MockWakeLock::expect_acquire`] / [`MockWakeLock::expect_release`] and check them
//! with [`MockWakeLock::verify`].

use crate::framework::core::{
    stop_hints, ActorHandle, HintReceiver, RequestActor, RequestClient, WakeCapability,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A call observed by the mock capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockCall {
    Acquire,
    Release,
}

#[derive(Default)]
struct MockState {
    held: bool,
    calls: Vec<LockCall>,
    expectations: VecDeque<LockCall>,
}

/// A journaling wake lock for tests.
///
/// # Example
/// ```ignore
/// let lock = MockWakeLock::new();
/// lock.expect_acquire();
/// lock.expect_release();
///
/// let (actor, client) = RequestActor::new(lock.clone());
/// // drive the actor...
/// lock.verify(); // the actor made exactly these calls, in this order
/// ```
#[derive(Clone, Default)]
pub struct MockWakeLock {
    state: Arc<Mutex<MockState>>,
}

impl MockWakeLock {
    /// Creates a released mock with an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every acquire/release the capability received, oldest first.
    pub fn calls(&self) -> Vec<LockCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn acquire_count(&self) -> usize {
        self.count(LockCall::Acquire)
    }

    pub fn release_count(&self) -> usize {
        self.count(LockCall::Release)
    }

    /// Queues an expected `acquire` call.
    pub fn expect_acquire(&self) -> &Self {
        self.state.lock().unwrap().expectations.push_back(LockCall::Acquire);
        self
    }

    /// Queues an expected `release` call.
    pub fn expect_release(&self) -> &Self {
        self.state.lock().unwrap().expectations.push_back(LockCall::Release);
        self
    }

    /// Panics unless the journal matches the queued expectations exactly.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        let expected: Vec<LockCall> = state.expectations.iter().copied().collect();
        if state.calls != expected {
            panic!(
                "Wake lock calls did not match expectations. expected {:?}, got {:?}",
                expected, state.calls
            );
        }
    }

    fn count(&self, call: LockCall) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == call)
            .count()
    }
}

impl WakeCapability for MockWakeLock {
    fn acquire(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.held = true;
        state.calls.push(LockCall::Acquire);
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.held = false;
        state.calls.push(LockCall::Release);
    }

    fn is_held(&self) -> bool {
        self.state.lock().unwrap().held
    }
}

/// A running actor backed by a [`MockWakeLock`].
pub struct MockActor {
    pub lock: MockWakeLock,
    pub client: RequestClient,
    pub handle: ActorHandle,
    pub hints: HintReceiver,
}

/// Starts a [`RequestActor`] over a fresh [`MockWakeLock`].
///
/// Must be called from within a Tokio runtime.
pub fn start_mock_actor() -> MockActor {
    let lock = MockWakeLock::new();
    let (actor, client) = RequestActor::new(lock.clone());
    let (hint_tx, hints) = stop_hints();
    let handle = actor.start(hint_tx);
    MockActor {
        lock,
        client,
        handle,
        hints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_journal_and_verify() {
        let mut lock = MockWakeLock::new();
        lock.expect_acquire().expect_release();

        lock.acquire();
        assert!(lock.is_held());
        lock.release();

        assert_eq!(lock.calls(), vec![LockCall::Acquire, LockCall::Release]);
        lock.verify();
    }

    #[test]
    #[should_panic(expected = "did not match expectations")]
    fn test_verify_fails_on_missing_call() {
        let mut lock = MockWakeLock::new();
        lock.expect_acquire().expect_release();
        lock.acquire();
        lock.verify();
    }

    #[tokio::test]
    async fn test_start_mock_actor() {
        let mock = start_mock_actor();
        mock.lock.expect_acquire();

        mock.client.submit_set_keep_awake(true);
        assert!(mock.client.query().await.unwrap());
        mock.lock.verify();

        let report = mock.handle.stop().await.unwrap();
        assert!(report.released_on_teardown);
    }
}
