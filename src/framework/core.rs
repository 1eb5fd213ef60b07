//! # Core Actor Framework
//!
//! This module defines the building blocks of the keep-awake actor.
//!
//! ## Key Types
//!
//! - [`WakeCapability`]: The platform primitive the actor drives (acquire, release, is_held).
//! - [`Command`]: The two requests a caller can make (`SetKeepAwake`, `IsKeepingAwake`).
//! - [`RequestActor`]: The single consumer that owns the wake lock and drains the mailbox.
//! - [`RequestClient`]: The cloneable, non-blocking submission half.
//! - [`ActorHandle`]: What the host keeps to stop the actor.
//! - [`FrameworkError`]: Errors surfaced by the async helpers (never by submission).

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::framework::owner::ResourceOwner;

/// Field value used in every log line emitted by the actor.
const RESOURCE: &str = "wake_lock";

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// The platform wake lock, as seen by the actor.
///
/// # Architecture Note
/// Implementations are plain synchronous values and are **not** required to be
/// thread-safe. The actor moves the capability into its own task and is the only
/// code that ever calls these methods, so `&mut self` is enough.
///
/// The capability is assumed to be infallible and non-blocking: there is no error
/// channel because the platforms this models offer none.
pub trait WakeCapability: Send + 'static {
    /// Take the lock. The device must not suspend while it is held.
    fn acquire(&mut self);

    /// Give the lock back.
    fn release(&mut self);

    /// Whether the lock is currently held.
    fn is_held(&self) -> bool;
}

// =============================================================================
// 2. THE MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
///
/// Submission never returns these; they only come out of the async helpers
/// ([`RequestClient::query`], [`ActorHandle::stop`]).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped reply callback")]
    ActorDropped,
    #[error("No reply within {0:?}")]
    ReplyTimeout(Duration),
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

/// A one-shot continuation that receives a query result.
///
/// Ownership moves into the mailbox on submission; the actor fires it at most once
/// and then drops it.
pub type Callback<T> = Box<dyn FnOnce(T) + Send + 'static>;

/// A request submitted to the [`RequestActor`].
pub enum Command {
    /// Fire-and-forget: acquire (`true`) or release (`false`) the wake lock.
    SetKeepAwake { desired: bool },
    /// Ask whether the wake lock is held; `reply` is called exactly once if the
    /// command is processed.
    IsKeepingAwake { reply: Callback<bool> },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetKeepAwake { desired } => f
                .debug_struct("SetKeepAwake")
                .field("desired", desired)
                .finish(),
            Command::IsKeepingAwake { .. } => f.debug_struct("IsKeepingAwake").finish_non_exhaustive(),
        }
    }
}

/// Advisory signal published to the host after a `SetKeepAwake(false)` was processed.
///
/// The host may use it to decide whether to tear the actor down. The actor keeps
/// accepting commands until that actually happens. A later `SetKeepAwake(true)`
/// withdraws the pending hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopHint {
    /// Position of the releasing command in the actor's processing order (1-based).
    pub generation: u64,
}

/// Publishing half of the stop-hint slot. Holds the pending hint, if any.
pub type HintSender = watch::Sender<Option<StopHint>>;

/// Observing half of the stop-hint slot.
pub type HintReceiver = watch::Receiver<Option<StopHint>>;

/// Creates an empty stop-hint slot.
///
/// Only the latest hint is kept, so a host that never reads it does not accumulate
/// anything.
pub fn stop_hints() -> (HintSender, HintReceiver) {
    watch::channel(None)
}

/// Lifecycle state of a [`RequestActor`], as observed by its clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    Stopped,
    Running,
}

/// Summary produced when the actor is torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    /// Commands handled while running.
    pub processed: u64,
    /// Commands still queued at teardown; their callbacks never fire.
    pub dropped: usize,
    /// Whether teardown had to force a release because the lock was still held.
    pub released_on_teardown: bool,
}

// =============================================================================
// 3. THE ACTOR SERVER
// =============================================================================

/// The single consumer that owns the wake lock.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the [`ResourceOwner`] and
/// the receiving end of the mailbox.
///
/// **Concurrency Model**:
/// Any number of [`RequestClient`] clones may submit concurrently, but commands are
/// handled one at a time, oldest first, inside a single Tokio task. The wake lock is
/// never shared, so it needs no `Mutex`: exclusive ownership inside the task is the
/// synchronisation.
///
/// # Lifecycle
/// `new()` allocates the mailbox and the owner (still `Stopped`). [`RequestActor::start`]
/// consumes the actor and spawns it (`Running`). [`ActorHandle::stop`] tears it down
/// (`Stopped`, terminal). A stopped actor cannot be started again; build a new one.
pub struct RequestActor<C: WakeCapability> {
    receiver: mpsc::UnboundedReceiver<Command>,
    owner: ResourceOwner<C>,
    running: Arc<AtomicBool>,
    processed: u64,
}

impl<C: WakeCapability> RequestActor<C> {
    /// Creates the actor around `capability` and the client used to reach it.
    ///
    /// The mailbox is unbounded: submission must never block or lose a command.
    pub fn new(capability: C) -> (Self, RequestClient) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(false));
        let actor = Self {
            receiver,
            owner: ResourceOwner::new(capability),
            running: running.clone(),
            processed: 0,
        };
        let client = RequestClient::new(sender, running);
        (actor, client)
    }

    /// Spawns the actor's event loop and returns the handle used to stop it.
    ///
    /// # Context Injection
    /// `hints` is where [`StopHint`]s go. It is injected here rather than in `new()`
    /// so the host can wire it up after creating the client.
    pub fn start(self, hints: HintSender) -> ActorHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        self.running.store(true, Ordering::Release);
        let running = self.running.clone();
        let task = tokio::spawn(self.run(shutdown_rx, hints));
        ActorHandle {
            shutdown: Some(shutdown_tx),
            running,
            task,
        }
    }

    async fn run(
        mut self,
        mut shutdown: oneshot::Receiver<()>,
        hints: HintSender,
    ) -> TeardownReport {
        info!(resource = RESOURCE, "Actor started");

        loop {
            tokio::select! {
                // A pending stop wins over queued work: whatever is left is dropped.
                biased;
                _ = &mut shutdown => break,
                msg = self.receiver.recv() => match msg {
                    Some(command) => self.handle(command, &hints),
                    None => {
                        debug!(resource = RESOURCE, "All clients dropped");
                        break;
                    }
                },
            }
        }

        self.teardown()
    }

    fn handle(&mut self, command: Command, hints: &HintSender) {
        self.processed += 1;
        match command {
            Command::SetKeepAwake { desired: true } => {
                debug!(resource = RESOURCE, desired = true, "SetKeepAwake");
                self.owner.acquire();
                if hints.send_replace(None).is_some() {
                    debug!(resource = RESOURCE, "Pending stop hint withdrawn");
                }
            }
            Command::SetKeepAwake { desired: false } => {
                debug!(resource = RESOURCE, desired = false, "SetKeepAwake");
                self.owner.release();
                let hint = StopHint {
                    generation: self.processed,
                };
                hints.send_replace(Some(hint));
                if hints.is_closed() {
                    debug!(resource = RESOURCE, "No host listening for stop hints");
                }
            }
            Command::IsKeepingAwake { reply } => {
                let held = self.owner.is_held();
                debug!(resource = RESOURCE, held, "IsKeepingAwake");
                if panic::catch_unwind(AssertUnwindSafe(move || reply(held))).is_err() {
                    error!(resource = RESOURCE, "Reply callback panicked");
                }
            }
        }
    }

    fn teardown(mut self) -> TeardownReport {
        self.running.store(false, Ordering::Release);
        let released_on_teardown = self.owner.shutdown();

        self.receiver.close();

        let mut dropped = 0;
        while let Ok(command) = self.receiver.try_recv() {
            debug!(resource = RESOURCE, ?command, "Dropped at teardown");
            dropped += 1;
        }
        if dropped > 0 {
            warn!(resource = RESOURCE, dropped, "Unprocessed commands dropped at teardown");
        }

        let report = TeardownReport {
            processed: self.processed,
            dropped,
            released_on_teardown,
        };
        info!(
            resource = RESOURCE,
            processed = report.processed,
            dropped = report.dropped,
            released_on_teardown,
            "Shutdown"
        );
        report
    }
}

/// The host's grip on a running [`RequestActor`].
pub struct ActorHandle {
    shutdown: Option<oneshot::Sender<()>>,
    running: Arc<AtomicBool>,
    task: JoinHandle<TeardownReport>,
}

impl ActorHandle {
    /// Signals the actor to stop without waiting for it.
    ///
    /// From this point submissions are refused. Commands already queued are dropped
    /// once the actor finishes the one it is currently handling.
    pub fn request_stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(shutdown) = self.shutdown.take() {
            // Err means the loop already exited on its own.
            let _ = shutdown.send(());
        }
    }

    /// Stops the actor and waits for teardown to finish.
    pub async fn stop(mut self) -> Result<TeardownReport, FrameworkError> {
        self.request_stop();
        self.task
            .await
            .map_err(|e| FrameworkError::TaskFailed(e.to_string()))
    }

    /// Whether the actor task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

// =============================================================================
// 4. THE CLIENT
// =============================================================================

/// Non-blocking submission handle for a [`RequestActor`].
///
/// Cheap to clone; every clone feeds the same FIFO mailbox. Submitting to an actor
/// that is not running is a silent no-op.
#[derive(Clone)]
pub struct RequestClient {
    sender: mpsc::UnboundedSender<Command>,
    running: Arc<AtomicBool>,
}

impl RequestClient {
    fn new(sender: mpsc::UnboundedSender<Command>, running: Arc<AtomicBool>) -> Self {
        Self { sender, running }
    }

    /// Current lifecycle state of the actor behind this client.
    pub fn state(&self) -> ActorState {
        if self.running.load(Ordering::Acquire) && !self.sender.is_closed() {
            ActorState::Running
        } else {
            ActorState::Stopped
        }
    }

    /// Enqueues a `SetKeepAwake` command and returns immediately.
    pub fn submit_set_keep_awake(&self, desired: bool) {
        self.submit(Command::SetKeepAwake { desired });
    }

    /// Enqueues an `IsKeepingAwake` query and returns immediately.
    ///
    /// `reply` runs on the actor's task, not the caller's. It is never called if the
    /// actor stops before reaching the query.
    pub fn submit_query<F>(&self, reply: F)
    where
        F: FnOnce(bool) + Send + 'static,
    {
        self.submit(Command::IsKeepingAwake {
            reply: Box::new(reply),
        });
    }

    /// Submits a query and awaits its reply.
    ///
    /// Resolves to [`FrameworkError::ActorDropped`] as soon as the actor discards the
    /// query (not running, or stopped with the query still queued). There is no
    /// timeout here; wrap it if you need one.
    pub async fn query(&self) -> Result<bool, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.submit_query(move |held| {
            let _ = respond_to.send(held);
        });
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    fn submit(&self, command: Command) {
        if !self.running.load(Ordering::Acquire) {
            debug!(resource = RESOURCE, ?command, "Actor not running, command dropped");
            return;
        }
        if let Err(mpsc::error::SendError(command)) = self.sender.send(command) {
            debug!(resource = RESOURCE, ?command, "Actor closed, command dropped");
        }
    }
}

// =============================================================================
// 5. TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{LockCall, MockWakeLock};
    use std::sync::mpsc as std_mpsc;
    use std::sync::Mutex;

    fn start(lock: &MockWakeLock) -> (RequestClient, ActorHandle, HintReceiver) {
        let (actor, client) = RequestActor::new(lock.clone());
        let (hint_tx, hint_rx) = stop_hints();
        let handle = actor.start(hint_tx);
        (client, handle, hint_rx)
    }

    #[tokio::test]
    async fn test_toggle_then_query_scenario() {
        let lock = MockWakeLock::new();
        let (client, handle, _hints) = start(&lock);

        client.submit_set_keep_awake(true);
        let (q1_tx, q1_rx) = oneshot::channel();
        client.submit_query(move |held| {
            let _ = q1_tx.send(held);
        });
        client.submit_set_keep_awake(false);
        let (q2_tx, q2_rx) = oneshot::channel();
        client.submit_query(move |held| {
            let _ = q2_tx.send(held);
        });

        assert!(q1_rx.await.unwrap());
        assert!(!q2_rx.await.unwrap());
        assert_eq!(lock.calls(), vec![LockCall::Acquire, LockCall::Release]);

        let report = handle.stop().await.unwrap();
        assert_eq!(report.processed, 4);
        assert!(!report.released_on_teardown);
    }

    #[tokio::test]
    async fn test_replies_follow_submission_order() {
        let lock = MockWakeLock::new();
        let (client, handle, _hints) = start(&lock);

        let replies = Arc::new(Mutex::new(Vec::new()));
        let pattern = [true, true, false, true, false, false, true];
        for (index, desired) in pattern.iter().enumerate() {
            client.submit_set_keep_awake(*desired);
            let replies = replies.clone();
            client.submit_query(move |held| replies.lock().unwrap().push((index, held)));
        }
        // Barrier: everything before this has been handled.
        assert!(client.query().await.unwrap());

        let replies = replies.lock().unwrap().clone();
        let expected: Vec<(usize, bool)> = pattern.iter().copied().enumerate().collect();
        assert_eq!(replies, expected);
        assert_eq!(
            lock.calls(),
            vec![
                LockCall::Acquire,
                LockCall::Release,
                LockCall::Acquire,
                LockCall::Release,
                LockCall::Acquire,
            ]
        );

        let report = handle.stop().await.unwrap();
        assert!(report.released_on_teardown);
    }

    #[tokio::test]
    async fn test_release_emits_stop_hint_and_keeps_running() {
        let lock = MockWakeLock::new();
        let (client, handle, mut hints) = start(&lock);

        client.submit_set_keep_awake(true);
        client.submit_set_keep_awake(false);
        hints.changed().await.unwrap();
        assert_eq!(*hints.borrow_and_update(), Some(StopHint { generation: 2 }));

        // The hint is advisory: the actor still serves requests.
        client.submit_set_keep_awake(true);
        assert!(client.query().await.unwrap());
        assert_eq!(client.state(), ActorState::Running);

        // ...and the acquire took the pending hint back.
        assert_eq!(*hints.borrow(), None);

        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_submissions_before_start_are_dropped() {
        let lock = MockWakeLock::new();
        let (actor, client) = RequestActor::new(lock.clone());
        assert_eq!(client.state(), ActorState::Stopped);

        client.submit_set_keep_awake(true);
        assert_eq!(client.query().await, Err(FrameworkError::ActorDropped));

        let (hint_tx, _hint_rx) = stop_hints();
        let handle = actor.start(hint_tx);
        assert!(!client.query().await.unwrap());
        assert!(lock.calls().is_empty());
        handle.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_post_stop_silence() {
        let lock = MockWakeLock::new();
        let (client, handle, _hints) = start(&lock);

        client.submit_set_keep_awake(true);
        assert!(client.query().await.unwrap());
        let report = handle.stop().await.unwrap();
        assert!(report.released_on_teardown);
        assert_eq!(client.state(), ActorState::Stopped);

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        client.submit_query(move |_| flag.store(true, Ordering::SeqCst));
        client.submit_set_keep_awake(true);
        tokio::task::yield_now().await;

        assert!(!fired.load(Ordering::SeqCst));
        assert!(!lock.is_held());
        assert_eq!(lock.calls(), vec![LockCall::Acquire, LockCall::Release]);
        assert_eq!(client.query().await, Err(FrameworkError::ActorDropped));
    }

    #[tokio::test]
    async fn test_teardown_releases_exactly_once() {
        let lock = MockWakeLock::new();
        let (client, handle, _hints) = start(&lock);

        client.submit_set_keep_awake(true);
        client.submit_set_keep_awake(true);
        assert!(client.query().await.unwrap());

        let report = handle.stop().await.unwrap();
        assert!(report.released_on_teardown);
        assert_eq!(lock.acquire_count(), 1);
        assert_eq!(lock.release_count(), 1);
        assert!(!lock.is_held());
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_kill_actor() {
        let lock = MockWakeLock::new();
        let (client, handle, _hints) = start(&lock);

        client.submit_query(|_| panic!("caller bug"));
        client.submit_set_keep_awake(true);
        assert!(client.query().await.unwrap());

        assert!(!handle.is_finished());
        handle.stop().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queued_commands_dropped_at_teardown() {
        let lock = MockWakeLock::new();
        let (client, mut handle, _hints) = start(&lock);

        // Park the consumer inside a reply callback.
        let (entered_tx, entered_rx) = std_mpsc::channel();
        let (gate_tx, gate_rx) = std_mpsc::channel::<()>();
        client.submit_query(move |_| {
            let _ = entered_tx.send(());
            let _ = gate_rx.recv();
        });
        entered_rx.recv().unwrap();

        let fired = Arc::new(AtomicBool::new(false));
        for _ in 0..3 {
            let flag = fired.clone();
            client.submit_query(move |_| flag.store(true, Ordering::SeqCst));
        }
        client.submit_set_keep_awake(true);

        handle.request_stop();
        gate_tx.send(()).unwrap();
        let report = handle.stop().await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.dropped, 4);
        assert!(!fired.load(Ordering::SeqCst));
        assert!(lock.calls().is_empty());
    }

    /// A capability that notes whether the mailbox was already closed when it was
    /// released.
    struct ReleaseOrderLock {
        held: bool,
        client: Arc<Mutex<Option<RequestClient>>>,
        mailbox_open_at_release: Arc<Mutex<Option<bool>>>,
    }

    impl WakeCapability for ReleaseOrderLock {
        fn acquire(&mut self) {
            self.held = true;
        }

        fn release(&mut self) {
            self.held = false;
            let open = self
                .client
                .lock()
                .unwrap()
                .as_ref()
                .map(|client| !client.sender.is_closed());
            *self.mailbox_open_at_release.lock().unwrap() = open;
        }

        fn is_held(&self) -> bool {
            self.held
        }
    }

    #[tokio::test]
    async fn test_teardown_releases_before_discarding_mailbox() {
        let slot = Arc::new(Mutex::new(None));
        let observed = Arc::new(Mutex::new(None));
        let (actor, client) = RequestActor::new(ReleaseOrderLock {
            held: false,
            client: slot.clone(),
            mailbox_open_at_release: observed.clone(),
        });
        *slot.lock().unwrap() = Some(client.clone());

        let (hint_tx, _hint_rx) = stop_hints();
        let handle = actor.start(hint_tx);
        client.submit_set_keep_awake(true);
        assert!(client.query().await.unwrap());

        let report = handle.stop().await.unwrap();
        assert!(report.released_on_teardown);
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }
}
